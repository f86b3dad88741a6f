/// Desk types that seat more than one person, in ascending seat order.
const SEATS_PER_DESK: &[(&str, u32)] = &[
    ("Double Desk", 2),
    ("Enclosed Pair", 2),
    ("Team of 4", 4),
    ("Team of 6", 6),
    ("Team of 8", 8),
];

/// Desk types that are already mirrored and so are laid out single-loaded.
const DOUBLE_SIDED: &[&str] = &["Double Desk", "Enclosed Pair"];

/// Seats provided by one desk of `desk_type`; unknown types count as one.
#[must_use]
pub fn seats_per_desk(desk_type: &str) -> u32 {
    SEATS_PER_DESK
        .iter()
        .find(|(name, _)| *name == desk_type)
        .map_or(1, |(_, seats)| *seats)
}

#[must_use]
pub fn is_double_sided(desk_type: &str) -> bool {
    DOUBLE_SIDED.contains(&desk_type)
}
