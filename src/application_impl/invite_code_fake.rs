use crate::application_port::*;
use crate::domain_model::InviteCode;
use std::sync::Mutex;

/// Hands out a fixed sequence of codes, repeating the last one when the
/// script runs out. Used to force invite-code collisions.
#[derive(Debug)]
pub struct ScriptedInviteCodes {
    script: Mutex<Vec<String>>,
    last: String,
}

impl ScriptedInviteCodes {
    pub fn new(codes: &[&str]) -> Self {
        let mut script: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        let last = script.last().cloned().unwrap_or_else(|| "GRP-AAAAAA".to_owned());
        script.reverse();
        Self {
            script: Mutex::new(script),
            last,
        }
    }
}

impl InviteCodeGenerator for ScriptedInviteCodes {
    fn generate(&self) -> InviteCode {
        let next = match self.script.lock() {
            Ok(mut script) => script.pop(),
            Err(_) => None,
        };
        InviteCode(next.unwrap_or_else(|| self.last.clone()))
    }
}
