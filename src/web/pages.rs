//! Server-rendered HTML pages
//!
//! Every dynamic string goes through [`escape`] before it lands in markup.

use crate::features::{Assortment, DayOfWeek, FeatureVector, StoreInputs, StoreType, FEATURE_NAMES};
use crate::predict::{format_currency, PredictionReport};
use std::fmt::Write;

pub const APP_TITLE: &str = "Rossmann Sales Prediction";
pub const AUTHOR: &str = "Abdullahy Bashir";
pub const ARTICLE_URL: &str = "https://abdullahybashir.hashnode.dev/end-to-end-sales-prediction-for-rossmann-stores-a-detailed-technical-walkthrough";

/// Sidebar entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Analysis,
}

impl Page {
    const ALL: [Page; 3] = [Page::Home, Page::About, Page::Analysis];

    fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Analysis => "Analysis",
        }
    }

    fn href(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Analysis => "/analysis",
        }
    }
}

/// Everything the home page can show
#[derive(Debug, Default)]
pub struct HomeView {
    pub inputs: StoreInputs,
    pub report: Option<PredictionReport>,
    /// Input or prediction error shown above the form
    pub error: Option<String>,
    /// Set when no model could be loaded; replaces the form
    pub model_error: Option<String>,
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
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

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
nav { width: 220px; background: #f0f2f6; padding: 24px; box-sizing: border-box; }
nav a { display: block; padding: 6px 0; color: #262730; text-decoration: none; }
nav a.active { font-weight: bold; color: #ff4b4b; }
main { flex: 1; padding: 32px 48px; max-width: 1100px; }
.columns { display: flex; gap: 48px; }
.columns > section { flex: 1; }
label { display: block; margin-top: 12px; }
input[type=number], select { width: 100%; padding: 4px; }
.success { background: #e8f5e9; padding: 12px; border-radius: 6px; }
.warning { background: #fff8e1; padding: 12px; border-radius: 6px; }
.error { background: #ffebee; padding: 12px; border-radius: 6px; }
.info { background: #e3f2fd; padding: 12px; border-radius: 6px; }
button { background: #ff4b4b; color: white; border: none; padding: 8px 16px; border-radius: 6px; }
"#;

/// Wrap a page body in the shared layout with sidebar navigation
pub fn layout(active: Page, body: &str) -> String {
    let mut nav = String::new();
    for page in Page::ALL {
        let class = if page == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{}>{}</a>", page.href(), class, page.label());
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <nav><h2>Navigation</h2>{nav}<hr><p>Built by {author}</p></nav>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        title = APP_TITLE,
        style = STYLE,
        nav = nav,
        author = AUTHOR,
        body = body,
    )
}

fn options<T: Copy + PartialEq>(
    values: &[T],
    selected: T,
    value: impl Fn(T) -> String,
    label: impl Fn(T) -> String,
) -> String {
    let mut html = String::new();
    for &v in values {
        let mark = if v == selected { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            escape(&value(v)),
            mark,
            escape(&label(v))
        );
    }
    html
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

fn render_form(inputs: &StoreInputs) -> String {
    let days = options(
        &DayOfWeek::ALL,
        inputs.day_of_week,
        |d| d.number().to_string(),
        |d| d.name().to_string(),
    );
    let stores = options(
        &StoreType::ALL,
        inputs.store_type,
        |t| t.code().to_string(),
        |t| t.code().to_string(),
    );
    let assortments = options(
        &Assortment::ALL,
        inputs.assortment,
        |a| a.code().to_string(),
        |a| a.code().to_string(),
    );

    format!(
        r#"<form method="get" action="/predict">
<div class="columns">
<section>
<h3>Store Information</h3>
<label>Day of Week <select name="day_of_week">{days}</select></label>
<label title="This has the biggest impact on sales prediction!">Number of Customers
<input type="number" name="customers" min="0" value="{customers}"></label>
<label>Store Type <select name="store_type">{stores}</select></label>
<label>Assortment <select name="assortment">{assortments}</select></label>
</section>
<section>
<h3>Promotional Information</h3>
<label>Promo (%) <input type="range" name="promo" min="0" max="100" value="{promo}"></label>
<label><input type="checkbox" name="promo2"{promo2}> Promo2</label>
<label><input type="checkbox" name="school_holiday"{holiday}> School Holiday</label>
<label title="Distance to nearest competitor - affects sales significantly!">Competition Distance (km)
<input type="number" name="competition_distance" min="0" value="{distance}"></label>
<label>Month <input type="number" name="month" min="1" max="12" value="{month}"></label>
<label>Day <input type="number" name="day" min="1" max="31" value="{day}"></label>
</section>
</div>
<hr>
<h3>Sales Prediction</h3>
<button type="submit">Predict Sales</button>
<a href="/">Clear All</a>
</form>"#,
        days = days,
        customers = inputs.customers,
        stores = stores,
        assortments = assortments,
        promo = inputs.promo_percent,
        promo2 = checked(inputs.promo2),
        holiday = checked(inputs.school_holiday),
        distance = inputs.competition_distance,
        month = inputs.month,
        day = inputs.day,
    )
}

fn render_report(report: &PredictionReport) -> String {
    let mut html = format!(
        "<p class=\"success\"><strong>Predicted Sales: {}</strong></p>\n\
         <h3>What's affecting this prediction:</h3>\n<ul>",
        escape(&format_currency(report.prediction))
    );
    for probe in &report.probes {
        let _ = write!(html, "<li>{}</li>", escape(&probe.describe()));
    }
    html.push_str("</ul>");
    html
}

fn render_debug(features: &FeatureVector) -> String {
    let names = FEATURE_NAMES
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ");
    let mut rows = String::new();
    for (name, value) in features.named() {
        let _ = write!(rows, "<tr><td>{}</td><td>{}</td></tr>", escape(name), value);
    }
    format!(
        "<details>\n<summary>Debug Information</summary>\n\
         <p>Feature values: <code>{}</code></p>\n\
         <p>Feature names: <code>[{}]</code></p>\n\
         <table>{}</table>\n</details>",
        escape(&features.to_string()),
        escape(&names),
        rows
    )
}

pub fn home_page(view: &HomeView) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p style=\"font-size:18px\">Predict daily sales for Rossmann stores \
         using a machine learning model. Adjust the inputs to see how different factors \
         affect sales!</p>\n<hr>\n",
        APP_TITLE
    );

    if let Some(reason) = &view.model_error {
        let _ = write!(
            body,
            "<p class=\"warning\">Model not loaded. Please check the model file or download link.</p>\n\
             <p class=\"error\">{}</p>",
            escape(reason)
        );
        return layout(Page::Home, &body);
    }

    if let Some(error) = &view.error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    body.push_str(&render_form(&view.inputs));
    body.push('\n');
    if let Some(report) = &view.report {
        body.push_str(&render_report(report));
        body.push('\n');
    }
    body.push_str(&render_debug(&FeatureVector::from_inputs(&view.inputs)));

    layout(Page::Home, &body)
}

pub fn about_page() -> String {
    let body = format!(
        "<h1>About This Project</h1>\n<h3>{title}</h3>\n\
         <p>This web application predicts daily sales for Rossmann stores using a machine \
         learning model trained on historical data. The project demonstrates the power of \
         data-driven decision making in retail, allowing users to experiment with different \
         store and promotional scenarios to see their impact on sales.</p>\n\
         <p><strong>Author:</strong> {author}<br>\n\
         <strong>Technologies:</strong> Rust, axum, scikit-learn, Machine Learning</p>\n\
         <h4>About the Author</h4>\n\
         <p>{author} is a passionate data scientist and machine learning engineer with a keen \
         interest in building impactful solutions for real-world business problems.</p>",
        title = APP_TITLE,
        author = AUTHOR
    );
    layout(Page::About, &body)
}

pub fn analysis_page() -> String {
    let body = format!(
        "<h1>Analysis &amp; Technical Walkthrough</h1>\n\
         <h3>End-to-End Sales Prediction for Rossmann Stores</h3>\n\
         <p>Dive deep into the technical details, data exploration, feature engineering, and \
         modeling process behind this app in the following Hashnode article:</p>\n\
         <p><a href=\"{url}\" target=\"_blank\"><strong>Read the full article on Hashnode</strong></a></p>\n\
         <iframe src=\"{url}\" height=\"600\" width=\"100%\" style=\"border:none;\"></iframe>\n\
         <p class=\"info\">If the article does not display above, please use the link to open \
         it in a new tab.</p>",
        url = ARTICLE_URL
    );
    layout(Page::Analysis, &body)
}
