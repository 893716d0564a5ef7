/// Convert between UCSC (`chr1`, `chrM`) and Ensembl (`1`, `MT`) chromosome names.
pub fn change_chrom_names(chrom: &str) -> String {
    match chrom.strip_prefix("chr") {
        Some("M") => "MT".to_string(),
        Some(rest) => rest.to_string(),
        None if chrom == "MT" => "chrM".to_string(),
        None => format!("chr{}", chrom),
    }
}

/// The `chr`-prefixed form used as index key.
pub fn canonical_chrom(chrom: &str) -> String {
    if chrom.starts_with("chr") {
        chrom.to_string()
    } else {
        change_chrom_names(chrom)
    }
}
