/// Turns a filename into a link label usable as a provenance key:
/// ASCII alphanumerics and single underscores only, never starting with a
/// digit. `1AKI_clean.pdb` becomes `file_1AKI_clean_pdb`.
pub fn format_link_label(filename: &str) -> String {
    let mut label = String::with_capacity(filename.len());
    for c in filename.chars() {
        if c.is_ascii_alphanumeric() {
            label.push(c);
        } else if !label.is_empty() && !label.ends_with('_') {
            label.push('_');
        }
    }
    while label.ends_with('_') {
        label.pop();
    }
    if label.is_empty() || label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert_str(0, "file_");
    }
    label
}
