//! Macros for reducing boilerplate in widget builders.

/// Generates a builder-style setter method for a field.
///
/// # Usage
///
/// ```ignore
/// // When method name matches field name:
/// builder_field!(search_enabled, bool);
/// // Generates: pub fn search_enabled(mut self, value: bool) -> Self { self.search_enabled = value; self }
///
/// // When method name differs from field name:
/// builder_field!(searchable, search_enabled, bool);
/// ```
#[macro_export]
macro_rules! builder_field {
    // Method name matches field name
    ($name:ident, $type:ty) => {
        pub fn $name(mut self, value: $type) -> Self {
            self.$name = value;
            self
        }
    };
    // Method name differs from field name
    ($method:ident, $field:ident, $type:ty) => {
        pub fn $method(mut self, value: $type) -> Self {
            self.$field = value;
            self
        }
    };
}
