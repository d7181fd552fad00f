use std::{
    fmt,
    fmt::{Debug, Display},
};

/// Wraps API keys and other credentials so that they never end up in logs by accident.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// True if no credential has been configured
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Compares `presented` with the secret. Every byte is compared, so timing does not leak the length of a matching
    /// prefix.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.value.as_bytes();
        let presented = presented.as_bytes();
        presented.len() == expected.len() &&
            presented.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
