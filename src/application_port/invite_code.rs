use crate::domain_model::InviteCode;

pub const INVITE_CODE_LEN: usize = 6;

/// Uppercase letters and digits minus the look-alikes `I`, `O`, `0`, `1`.
pub const INVITE_CODE_ALPHABET: [char; 32] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Stateless. Uniqueness is enforced where the code is stored.
pub trait InviteCodeGenerator: Send + Sync {
    fn generate(&self) -> InviteCode;
}
