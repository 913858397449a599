//! Markup generation for popup content.
//!
//! Every optional field contributes its block only when present; an absent
//! field contributes nothing. Text is escaped before it is placed in markup.

use std::fmt::Write;

use crate::options::DataTable;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Markup for an info card: image, then title and description.
pub fn info_markup(
    title: Option<&str>,
    description: Option<&str>,
    image_source: Option<&str>,
) -> String {
    let mut out = String::from(r#"<section class="map-box-info">"#);
    if let Some(src) = image_source {
        let _ = write!(
            out,
            r#"<div class="map-box-info__image"><img src="{}" /></div>"#,
            escape(src)
        );
    }
    out.push_str(r#"<div class="map-box-info__content">"#);
    if let Some(title) = title {
        let _ = write!(out, r#"<p class="map-box-info__title">{}</p>"#, escape(title));
    }
    if let Some(description) = description {
        let _ = write!(
            out,
            r#"<p class="map-box-info__description">{}</p>"#,
            escape(description)
        );
    }
    out.push_str("</div></section>");
    out
}

/// Markup for a data table: optional header, then one row per entry in table order.
pub fn data_markup(title: Option<&str>, data: Option<&DataTable>) -> String {
    let mut out = String::from(r#"<section class="map-box-data">"#);
    if let Some(title) = title {
        let _ = write!(
            out,
            r#"<div class="map-data-box__header"><h3 class="map-data-box__header__text">{}</h3></div>"#,
            escape(title)
        );
    }
    if let Some(data) = data {
        out.push_str(r#"<div class="map-data-box__table">"#);
        for (label, value) in data.iter() {
            let _ = write!(
                out,
                r#"<div class="map-data-box__table__cell"><p>{}</p></div><div class="map-data-box__table__cell"><p>{}</p></div>"#,
                escape(label),
                escape(value)
            );
        }
        out.push_str("</div>");
    }
    out.push_str("</section>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_title_only() {
        let markup = info_markup(Some("Alpha"), None, None);
        assert!(markup.contains(r#"<p class="map-box-info__title">Alpha</p>"#));
        assert!(!markup.contains("<img"));
        assert!(!markup.contains("map-box-info__description"));
    }

    #[test]
    fn test_info_image_precedes_content() {
        let markup = info_markup(Some("Alpha"), Some("Site"), Some("thumb.png"));
        let image = markup.find("<img").unwrap();
        let title = markup.find("map-box-info__title").unwrap();
        let description = markup.find("map-box-info__description").unwrap();
        assert!(image < title && title < description);
    }

    #[test]
    fn test_info_empty_is_well_formed() {
        assert_eq!(
            info_markup(None, None, None),
            r#"<section class="map-box-info"><div class="map-box-info__content"></div></section>"#
        );
    }

    #[test]
    fn test_data_rows_follow_table_order() {
        let table = DataTable::new()
            .with_entry("Name", "Tokyo")
            .with_entry("Location", "Japan");
        let markup = data_markup(None, Some(&table));
        let name = markup.find("<p>Name</p>").unwrap();
        let location = markup.find("<p>Location</p>").unwrap();
        assert!(name < location);
        assert!(!markup.contains("map-data-box__header"));
    }

    #[test]
    fn test_data_without_table() {
        let markup = data_markup(Some("Depot"), None);
        assert!(markup.contains("Depot"));
        assert!(!markup.contains("map-data-box__table"));
    }

    #[test]
    fn test_text_is_escaped() {
        let markup = info_markup(Some("<b>A & B</b>"), None, Some("a\"b"));
        assert!(markup.contains("&lt;b&gt;A &amp; B&lt;/b&gt;"));
        assert!(markup.contains(r#"src="a&quot;b""#));
    }
}
