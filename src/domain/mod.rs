pub mod playlist;
pub mod track;

/// Deserializer for nullable patch fields where "absent" and "null" mean
/// different things: absent leaves the stored value alone, null clears it.
/// Wrapping in `Some` records that the field was present at all.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
