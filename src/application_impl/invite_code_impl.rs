use crate::application_port::*;
use crate::domain_model::InviteCode;
use nanoid::nanoid;

pub const DEFAULT_INVITE_PREFIX: &str = "GRP-";

pub struct NanoidInviteCodes {
    prefix: String,
}

impl NanoidInviteCodes {
    /// The prefix is upper-cased so minted codes match their normalized lookup form.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().to_uppercase(),
        }
    }
}

impl Default for NanoidInviteCodes {
    fn default() -> Self {
        Self::new(DEFAULT_INVITE_PREFIX)
    }
}

impl InviteCodeGenerator for NanoidInviteCodes {
    fn generate(&self) -> InviteCode {
        let body = nanoid!(INVITE_CODE_LEN, &INVITE_CODE_ALPHABET);
        InviteCode(format!("{}{body}", self.prefix))
    }
}
