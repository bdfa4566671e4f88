//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. In
/// this workspace roles and permissions are value objects: two roles with the
/// same canonical value are the same role, whatever table produced them.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
