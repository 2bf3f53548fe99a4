//! HTML description block for a listing

use crate::text::{clean_text, html_escape};
use crate::types::{SpecRecord, SENTINEL};

/// Render the spec table and the raw description into the fixed section
/// template. Both spec values and the description are HTML-escaped.
pub fn generate_description(specs: &SpecRecord, raw_description: &str) -> String {
    let rows: String = specs
        .entries()
        .map(|(key, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                key.label(),
                html_escape(value.as_str())
            )
        })
        .collect();

    let description = clean_text(raw_description).unwrap_or_else(|| SENTINEL.to_string());

    format!(
        r#"<section class="wheel-description">
  <h2>商品仕様</h2>
  <table class="wheel-specs">
    <tbody>
      {}
    </tbody>
  </table>
  <h2>商品説明</h2>
  <div class="wheel-raw-description">{}</div>
</section>"#,
        rows,
        html_escape(&description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, SpecKey};

    #[test]
    fn test_every_key_gets_a_row() {
        let html = generate_description(&SpecRecord::default(), "");

        assert_eq!(html.matches("<tr>").count(), SpecKey::ALL.len());
        for key in SpecKey::ALL {
            assert!(html.contains(&format!("<tr><th>{}</th><td>不明</td></tr>", key.label())));
        }
        assert!(html.contains(r#"<div class="wheel-raw-description">不明</div>"#));
        assert!(html.starts_with(r#"<section class="wheel-description">"#));
        assert!(html.ends_with("</section>"));
    }

    #[test]
    fn test_escapes_raw_text_and_values() {
        let specs = SpecRecord {
            model: Field::Known("<TE37>".to_string()),
            ..SpecRecord::default()
        };
        let html = generate_description(&specs, "  傷あり <script>alert('x')</script> & 汚れ\n");

        assert!(html.contains("<td>&lt;TE37&gt;</td>"));
        assert!(html.contains("傷あり &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; 汚れ"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_rows_follow_key_order() {
        let html = generate_description(&SpecRecord::default(), "x");
        let positions: Vec<usize> = SpecKey::ALL
            .iter()
            .map(|key| html.find(&format!("<th>{}</th>", key.label())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_deterministic() {
        let specs = SpecRecord {
            brand: Field::Known("BBS".to_string()),
            ..SpecRecord::default()
        };
        assert_eq!(
            generate_description(&specs, "RG-R 鍛造"),
            generate_description(&specs, "RG-R 鍛造")
        );
    }
}
