//! Synthetic page fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use stat_scout::acquire::Identity;

/// Column headers of an NCAA basketball season-to-date table (33 columns)
pub const BASKETBALL_COLUMNS: [&str; 33] = [
    "#", "Player", "Yr", "Pos", "Ht", "GP", "GS", "MP", "FGM", "FGA", "FG%", "3FG", "3FGA",
    "3FG%", "FT", "FTA", "FT%", "PTS", "Avg", "ORebs", "DRebs", "Tot Reb", "Avg Reb", "AST",
    "TO", "STL", "BLK", "Fouls", "Dbl Dbl", "Trpl Dbl", "DQ", "Tech Fouls", "Effective FG%",
];

fn page(title: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
  <nav>
    <a class="skipMask" href="/teams/history/MBB/246">Haverford</a>
    <a class="skipMask" href="/teams/611523">{heading}</a>
  </nav>
  <h1>{heading}</h1>
  {body}
</body>
</html>"#
    )
}

/// Renders a statistics table with linked player names
///
/// The first column is a jersey number, the second the linked player name;
/// every other column holds a numeric value. A totals row is placed in
/// `<tfoot>`.
pub fn stats_table(columns: &[String], rows: usize) -> String {
    let mut html = String::from("<table class=\"dataTable\">\n<thead><tr>");
    for column in columns {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in 0..rows {
        html.push_str("<tr>");
        for (index, _) in columns.iter().enumerate() {
            let cell = match index {
                0 => format!("<td>{}</td>", row + 1),
                1 => format!(
                    "<td><a href=\"/players/{}\">Player{:02}, Test</a></td>",
                    9000 + row,
                    row + 1
                ),
                _ => format!("<td>{}</td>", (row * 7 + index * 3) % 97),
            };
            html.push_str(&cell);
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n<tfoot><tr>");
    for (index, _) in columns.iter().enumerate() {
        let cell = if index == 1 { "Totals".to_string() } else { "0".to_string() };
        html.push_str(&format!("<td>{}</td>", cell));
    }
    html.push_str("</tr></tfoot>\n</table>");

    html
}

/// A small two-column summary table that must not be picked as the stats table
fn summary_table() -> &'static str {
    r#"<table class="summary"><tr><th>Record</th><th>Conference</th></tr><tr><td>14-9</td><td>8-6</td></tr></table>"#
}

/// Valid basketball team page: 33 columns, `rows` players
pub fn basketball_page(rows: usize) -> String {
    let columns = BASKETBALL_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    page(
        "2025-26 Men's Basketball Season to Date Stats",
        "Haverford College Men's Basketball",
        &format!("{}\n{}", summary_table(), stats_table(&columns, rows)),
    )
}

/// Valid team page whose table has exactly `columns` columns
pub fn n_column_page(columns: usize, rows: usize) -> String {
    let headers = std::iter::once("#".to_string())
        .chain(std::iter::once("Player".to_string()))
        .chain((2..columns).map(|i| format!("Stat {}", i)))
        .collect::<Vec<_>>();
    page(
        "2025-26 Season Statistics",
        "Haverford College Statistics",
        &stats_table(&headers, rows),
    )
}

/// Valid baseball team page before the season starts: context, no table
pub fn preseason_baseball_page() -> String {
    page(
        "2025-26 Baseball",
        "Haverford College Baseball",
        "<div class=\"card\"><p>No statistics are available for this season yet.</p></div>",
    )
}

/// Valid baseball team page with a header-only table
pub fn empty_table_baseball_page() -> String {
    page(
        "2025-26 Baseball",
        "Haverford College Baseball",
        "<table><thead><tr><th>Player</th><th>AB</th><th>H</th><th>AVG</th></tr></thead><tbody></tbody></table>",
    )
}

/// The page served for a nonexistent target id
pub fn not_found_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>NCAA Statistics - Page Not Found</title></head>
<body>
  <h1>Page Not Found</h1>
  <p>The team you requested does not exist.</p>
</body>
</html>"#
        .to_string()
}

/// A bot-challenge interstitial served with HTTP 200
pub fn block_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Just a moment...</title></head>
<body>
  <div id="challenge">Checking your browser. Please verify you are human.</div>
</body>
</html>"#
        .to_string()
}

/// A generic page with no entity context at all
pub fn no_context_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Welcome</title></head>
<body>
  <h1>Welcome</h1>
  <p>Select a team from the menu.</p>
</body>
</html>"#
        .to_string()
}

pub fn identity(label: &str, session: u64) -> Identity {
    let mut headers = BTreeMap::new();
    headers.insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());

    Identity {
        label: label.to_string(),
        user_agent: format!("Mozilla/5.0 (X11; Linux x86_64) StatScoutTest/{}", label),
        headers,
        session,
    }
}
