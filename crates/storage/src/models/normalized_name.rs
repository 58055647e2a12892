/// A newtype that ensures golfer names are compared in a normalized form
/// so that "Scottie  Scheffler" and "scottie scheffler" identify the same golfer.
///
/// Normalization trims the name, collapses internal whitespace runs to a single
/// space and lowercases it. It is used only for lookup, never stored as the
/// display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedFullName(String);

impl NormalizedFullName {
    /// # Examples
    ///
    /// ```
    /// use storage::models::NormalizedFullName;
    ///
    /// let a = NormalizedFullName::new("  Rory   McIlroy ");
    /// let b = NormalizedFullName::new("rory mcilroy");
    ///
    /// assert_eq!(a, b);
    /// ```
    pub fn new(full_name: &str) -> Self {
        let collapsed = full_name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self(collapsed.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NormalizedFullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
