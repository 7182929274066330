//! Structured address components and their text renderings.

use serde::{Deserialize, Serialize};

/// Address components returned by a reverse geocoder.
///
/// Every component is optional; renderings skip missing parts together with
/// their separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placemark {
    /// House number.
    pub sub_thoroughfare: Option<String>,
    /// Street name.
    pub thoroughfare: Option<String>,
    /// City or town.
    pub locality: Option<String>,
    /// State or province.
    pub administrative_area: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl Placemark {
    /// Returns true if no component is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.sub_thoroughfare,
            &self.thoroughfare,
            &self.locality,
            &self.administrative_area,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.is_none())
    }

    /// Street line over city line.
    ///
    /// ```text
    /// 1 Infinite Loop
    /// Cupertino CA 95014
    /// ```
    pub fn two_line(&self) -> String {
        let mut line1 = String::new();
        push_part(&mut line1, self.sub_thoroughfare.as_deref(), "");
        push_part(&mut line1, self.thoroughfare.as_deref(), " ");

        let mut line2 = String::new();
        push_part(&mut line2, self.locality.as_deref(), "");
        push_part(&mut line2, self.administrative_area.as_deref(), " ");
        push_part(&mut line2, self.postal_code.as_deref(), " ");

        push_part(&mut line1, Some(&line2), "\n");
        line1
    }

    /// Full address on one line, country included.
    pub fn single_line(&self) -> String {
        let mut line = String::new();
        push_part(&mut line, self.sub_thoroughfare.as_deref(), "");
        push_part(&mut line, self.thoroughfare.as_deref(), " ");
        push_part(&mut line, self.locality.as_deref(), ", ");
        push_part(&mut line, self.administrative_area.as_deref(), ", ");
        push_part(&mut line, self.postal_code.as_deref(), " ");
        push_part(&mut line, self.country.as_deref(), ", ");
        line
    }

    /// Street and city only, for list rows.
    pub fn short(&self) -> String {
        let mut line = String::new();
        push_part(&mut line, self.sub_thoroughfare.as_deref(), "");
        push_part(&mut line, self.thoroughfare.as_deref(), " ");
        push_part(&mut line, self.locality.as_deref(), ", ");
        line
    }
}

/// Append `text` to `line`, preceded by `separator` when `line` is non-empty.
fn push_part(line: &mut String, text: Option<&str>, separator: &str) {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    if !line.is_empty() {
        line.push_str(separator);
    }
    line.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Placemark {
        Placemark {
            sub_thoroughfare: Some("1".to_string()),
            thoroughfare: Some("Infinite Loop".to_string()),
            locality: Some("Cupertino".to_string()),
            administrative_area: Some("CA".to_string()),
            postal_code: Some("95014".to_string()),
            country: Some("United States".to_string()),
        }
    }

    #[test]
    fn test_two_line() {
        assert_eq!(full().two_line(), "1 Infinite Loop\nCupertino CA 95014");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(
            full().single_line(),
            "1 Infinite Loop, Cupertino, CA 95014, United States"
        );
    }

    #[test]
    fn test_short() {
        assert_eq!(full().short(), "1 Infinite Loop, Cupertino");
    }

    #[test]
    fn test_missing_parts_drop_separators() {
        let placemark = Placemark {
            thoroughfare: Some("Unter den Linden".to_string()),
            locality: Some("Berlin".to_string()),
            ..Default::default()
        };
        assert_eq!(placemark.two_line(), "Unter den Linden\nBerlin");
        assert_eq!(placemark.single_line(), "Unter den Linden, Berlin");
        assert_eq!(placemark.short(), "Unter den Linden, Berlin");
    }

    #[test]
    fn test_city_only_has_no_leading_newline() {
        let placemark = Placemark {
            locality: Some("Reykjavík".to_string()),
            ..Default::default()
        };
        assert_eq!(placemark.two_line(), "Reykjavík");
    }

    #[test]
    fn test_blank_components_are_skipped() {
        let placemark = Placemark {
            sub_thoroughfare: Some("  ".to_string()),
            thoroughfare: Some("Main St".to_string()),
            ..Default::default()
        };
        assert_eq!(placemark.short(), "Main St");
    }

    #[test]
    fn test_is_empty() {
        assert!(Placemark::default().is_empty());
        assert!(!full().is_empty());
    }
}
