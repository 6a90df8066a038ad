//! Object label derivation.

use super::{ObjectRecord, SmackLabel, SubjectRecord, SMACK_STAR, SMACK_WEB};

/// Compute an object label from a subject label.
///
/// Web-labeled subjects produce wildcard objects; every other label passes
/// through unchanged.
pub fn object_from_subject(from: &SmackLabel) -> SmackLabel {
    if from.as_str() == SMACK_WEB {
        SmackLabel::new(SMACK_STAR)
    } else {
        from.clone()
    }
}

/// Label a newly created object from its creating subject. Objects created
/// by privileged subjects are wildcard-accessible.
pub fn create_object(subject: &SubjectRecord, object: &mut ObjectRecord) {
    if subject.privileged {
        object.smack.assign(SMACK_STAR);
    } else {
        let derived = object_from_subject(&subject.smack);
        object.smack.assign(derived.as_str());
    }
}
