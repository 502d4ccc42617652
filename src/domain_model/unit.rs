use serde::Deserialize;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize)]
pub struct PageSize(pub u16);

impl PageSize {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}
