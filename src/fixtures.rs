// src/fixtures.rs
//
// Synthetic pages shaped like the live sources, for parser and pipeline tests.

use serde_json::json;

pub struct WorldometersRow {
    country: String,
    values: [String; 7],
}

impl WorldometersRow {
    /// `values`: total, new, deaths, new deaths, recovered, active, critical.
    pub fn new(country: &str, values: [&str; 7]) -> Self {
        Self {
            country: country.to_string(),
            values: values.map(str::to_string),
        }
    }
}

pub fn worldometers_page(rows: &[WorldometersRow]) -> String {
    worldometers_page_with(8, rows)
}

pub fn worldometers_page_with(aggregates: usize, rows: &[WorldometersRow]) -> String {
    let mut html = String::from(
        r#"<html><body><table id="main_table_countries_today"><thead><tr>
<th>#</th><th>Country,<br>Other</th><th>Total<br>Cases</th><th>New<br>Cases</th>
<th>Total<br>Deaths</th><th>New<br>Deaths</th><th>Total<br>Recovered</th>
<th>Active<br>Cases</th><th>Serious,<br>Critical</th><th>Tot&nbsp;Cases/<br>1M pop</th>
</tr></thead><tbody>
"#,
    );
    let regions = ["World", "Asia", "Europe", "North America", "South America", "Africa", "Oceania", ""];
    for i in 0..aggregates {
        let name = regions.get(i).copied().unwrap_or("Other");
        html.push_str(&format!(
            "<tr class=\"row_continent\"><td></td><td>{}</td><td>9,999</td><td>+9</td><td>99</td><td></td><td>9</td><td>9</td><td>9</td><td></td></tr>\n",
            name
        ));
    }
    for (i, row) in rows.iter().enumerate() {
        html.push_str(&format!("<tr><td>{}</td><td><a href=\"#\">{}</a></td>", i + 1, row.country));
        for v in &row.values {
            html.push_str(&format!("<td> {} </td>", v));
        }
        html.push_str("<td>12</td></tr>\n");
    }
    html.push_str(
        "<tr class=\"total_row\"><td></td><td>Total:</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td></td></tr>\n",
    );
    html.push_str("</tbody></table></body></html>");
    html
}

/// One daily ECDC row: raw country label, continent, cases, deaths.
pub type EcdcDay<'a> = (&'a str, &'a str, i64, i64);

pub fn ecdc_feed(days: &[EcdcDay<'_>]) -> String {
    let records: Vec<_> = days
        .iter()
        .enumerate()
        .map(|(i, (country, continent, cases, deaths))| {
            // The live feed mixes numeric and string encodings.
            let cases = if i % 2 == 0 { json!(cases) } else { json!(cases.to_string()) };
            json!({
                "dateRep": "14/12/2020",
                "cases": cases,
                "deaths": deaths,
                "countriesAndTerritories": country,
                "continentExp": continent,
            })
        })
        .collect();
    json!({ "records": records }).to_string()
}

pub struct NcovRow {
    country: String,
    values: [String; 6],
}

impl NcovRow {
    /// `values`: confirmed, new, deaths, new deaths, active, recovered.
    pub fn new(country: &str, values: [&str; 6]) -> Self {
        Self {
            country: country.to_string(),
            values: values.map(str::to_string),
        }
    }
}

/// Region row of the nCov2019 US table: region, confirmed, deaths, recovered.
pub type NcovRegion<'a> = (&'a str, &'a str, &'a str, &'a str);

pub fn ncov_page(rows: &[NcovRow], usa: &[NcovRegion<'_>]) -> String {
    let mut html = String::from(
        r#"<html><body><table id="sortable_table_world">
<tr><th>flag</th><th>Name</th><th>Confirmed</th><th>Changes Today</th><th>Percentage Day Change</th><th>Critical</th><th>Deceased</th><th>Changes Today</th><th>Percentage Death Change</th><th>Tests</th><th>Active</th><th>Recovered</th></tr>
<tr><td>*</td><td>World</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td></tr>
"#,
    );
    for row in rows {
        let v = &row.values;
        html.push_str(&format!(
            "<tr><td>★</td><td>{}</td><td>{}</td><td>{}</td><td>1.5%</td><td>Unknown</td><td>{}</td><td>{}</td><td>0.2%</td><td>123</td><td>{}</td><td>{}</td></tr>\n",
            row.country, v[0], v[1], v[2], v[3], v[4], v[5]
        ));
    }
    html.push_str("</table>\n<table id=\"sortable_table_unitedstates\">\n");
    html.push_str("<tr><th>flag</th><th>Name</th><th>Confirmed</th></tr>\n");
    html.push_str("<tr><td>*</td><td>United States</td><td>1</td></tr>\n");
    for (region, confirmed, deaths, recovered) in usa {
        html.push_str(&format!(
            "<tr><td>★</td><td>{}</td><td>{}</td><td>+1</td><td>0.1%</td><td>n</td><td>{}</td><td>+0</td><td>0%</td><td>5</td><td>6</td><td>{}</td></tr>\n",
            region, confirmed, deaths, recovered
        ));
    }
    html.push_str("</table></body></html>");
    html
}

/// Region row of the Worldometers US table: state, total cases, deaths, active.
pub type WorldometersRegion<'a> = (&'a str, &'a str, &'a str, &'a str);

pub fn worldometers_usa_page(rows: &[WorldometersRegion<'_>]) -> String {
    let mut html = String::from(
        r#"<html><body><table id="usa_table_countries_today"><thead>
<tr><th>#</th><th>USA State</th><th>Total Cases</th><th>New Cases</th><th>Total Deaths</th><th>New Deaths</th><th>Active Cases</th></tr>
</thead><tbody>
<tr><td></td><td>USA Total</td><td>9</td><td></td><td>9</td><td></td><td>9</td></tr>
"#,
    );
    for (i, (region, total, deaths, active)) in rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>\n{}\n</td><td>{}</td><td>+3</td><td>{}</td><td></td><td>{}</td></tr>\n",
            i + 1,
            region,
            total,
            deaths,
            active
        ));
    }
    html.push_str("<tr><td></td><td>Total:</td><td>9</td><td></td><td>9</td><td></td><td>9</td></tr>\n");
    html.push_str("</tbody></table></body></html>");
    html
}
