use crate::domain::model::Address;

pub const DEFAULT_HOUSE: &str = "1407";
pub const DEFAULT_STREET: &str = "OVERING STREET";

/// Parses a `;`- or newline-separated address list.
///
/// Each entry is `<house> <street...>`; the street is uppercased to match the
/// dataset. Entries without a street are skipped.
pub fn parse_address_list(raw: &str) -> Vec<Address> {
    raw.split(|c| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let house = parts.next()?;
            let street = parts.collect::<Vec<_>>().join(" ").to_uppercase();
            if street.is_empty() {
                tracing::warn!("Ignoring address without a street: {:?}", entry);
                return None;
            }
            Some(Address::new(house, street))
        })
        .collect()
}

/// Address list if it yields anything, else the single house/street pair.
pub fn resolve_addresses(list: Option<&str>, house: Option<&str>, street: Option<&str>) -> Vec<Address> {
    let parsed = list.map(parse_address_list).unwrap_or_default();
    if !parsed.is_empty() {
        return parsed;
    }

    vec![Address::new(
        house.unwrap_or(DEFAULT_HOUSE).trim(),
        street.unwrap_or(DEFAULT_STREET).trim().to_uppercase(),
    )]
}
