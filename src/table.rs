//! The firm table under the detail box.

use crate::page::escape_html;
use crate::selection::{Attr, SelectionState};
use crate::types::CasePoint;
use serde::Serialize;
use tracing::warn;

pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub firm: String,
    pub case_name: String,
}

impl Row {
    pub fn placeholder() -> Self {
        Row {
            firm: NO_DATA.to_string(),
            case_name: NO_DATA.to_string(),
        }
    }
}

/// Every case built by the selected point's firm, in table order.
///
/// Filtering is by firm alone, regardless of the selected district.
pub fn render(state: &SelectionState, cases: &[CasePoint]) -> Vec<Row> {
    let event = match state {
        SelectionState::Empty => return Vec::new(),
        SelectionState::Selected(event) => event,
    };

    let firm = match &event.attrs.firm {
        Attr::Present(firm) => firm,
        Attr::Absent => return vec![Row::placeholder()],
        Attr::Malformed => {
            warn!(?event, "Click carried a malformed firm, showing placeholder row");
            return vec![Row::placeholder()];
        }
    };

    cases
        .iter()
        .filter(|case| &case.firm == firm)
        .map(|case| Row {
            firm: case.firm.clone(),
            case_name: case.case_name.clone(),
        })
        .collect()
}

/// Renders rows as an HTML table body.
pub fn to_html(rows: &[Row]) -> String {
    let mut html = String::from("<table class=\"firm-table\"><thead><tr><th>Firm</th><th>Case</th></tr></thead><tbody>");
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(&row.firm),
            escape_html(&row.case_name)
        ));
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ClickEvent;
    use serde_json::json;

    fn case(firm: &str, case_name: &str) -> CasePoint {
        CasePoint {
            case: case_name.to_string(),
            district: "Lingya".to_string(),
            firm: firm.to_string(),
            case_name: case_name.to_string(),
            lat: 22.6,
            lon: 120.3,
            url: None,
        }
    }

    fn click(payload: serde_json::Value) -> SelectionState {
        SelectionState::Selected(ClickEvent::from_json(&payload))
    }

    #[test]
    fn empty_state_has_no_rows() {
        assert!(render(&SelectionState::Empty, &[case("Acme", "A1")]).is_empty());
    }

    #[test]
    fn keeps_duplicates_and_table_order() {
        let cases = [case("Acme", "A2"), case("Beta", "B1"), case("Acme", "A1"), case("Acme", "A2")];
        let rows = render(&click(json!({ "firm": "Acme" })), &cases);
        let names: Vec<_> = rows.iter().map(|r| r.case_name.as_str()).collect();
        assert_eq!(names, ["A2", "A1", "A2"]);
    }

    #[test]
    fn missing_or_malformed_firm_is_placeholder() {
        let cases = [case("Acme", "A1")];
        assert_eq!(render(&click(json!({ "case": "A1" })), &cases), vec![Row::placeholder()]);
        assert_eq!(render(&click(json!({ "firm": 12 })), &cases), vec![Row::placeholder()]);
    }

    #[test]
    fn unknown_or_empty_firm_is_a_miss() {
        let cases = [case("Acme", "A1")];
        assert!(render(&click(json!({ "firm": "Gamma" })), &cases).is_empty());
        assert!(render(&click(json!({ "firm": "" })), &cases).is_empty());
    }

    #[test]
    fn html_escapes_cells() {
        let html = to_html(&[Row {
            firm: "A&B".into(),
            case_name: "<x>".into(),
        }]);
        assert!(html.contains("<td>A&amp;B</td><td>&lt;x&gt;</td>"));
    }
}
