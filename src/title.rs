use crate::types::SpecRecord;

/// Compose the listing title from `specs`.
///
/// Layout: `{brand} {model} {diameter}インチ {width}J {offset} {hole_count}H PCD{pcd}`.
/// Unknown values print as the sentinel in their slot; nothing is omitted.
pub fn generate_title(specs: &SpecRecord) -> String {
    format!(
        "{} {} {}インチ {}J {} {}H PCD{}",
        specs.brand, specs.model, specs.diameter, specs.width, specs.offset, specs.hole_count, specs.pcd
    )
}
