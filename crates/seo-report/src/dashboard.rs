//! Static HTML dashboard.
//!
//! The dashboard only reads what a run wrote: metric cards show sheet row
//! counts verbatim, charts are the SVG images embedded by reference, and
//! each section previews one sheet page by page with a link to its CSV
//! export. Sections and preview pages are `<details>` elements so the page
//! needs no script to show or hide them. Markup is emitted through
//! `quick_xml::Writer`, which escapes every text node and attribute.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use seo_model::{OutputBundle, Value};
use tracing::{info, warn};

use crate::artifacts::artifact_file;
use crate::bundle::{
    CLIENT_ERRORS_SHEET, DEEP_PAGES_SHEET, HTML_PAGES_SHEET, HTTP11_PAGES_SHEET,
    LARGE_PAGES_SHEET, LOW_INLINKS_SHEET, LOW_READABILITY_SHEET, MISSING_CANONICAL_SHEET,
    NEAR_DUPLICATES_SHEET, OUTDATED_PAGES_SHEET, SLOW_PAGES_SHEET, SUBOPTIMAL_METAS_SHEET,
    SUBOPTIMAL_TITLES_SHEET, THIN_CONTENT_SHEET,
};
use crate::error::{ReportError, Result};
use crate::stats::{
    CONTENT_QUALITY_CHART, INDEXABILITY_CHART, LINK_CORRELATIONS_CHART, META_LENGTHS_CHART,
    PAGE_SIZE_CHART, STATUS_CODES_CHART, TITLE_LENGTHS_CHART, chart_image_file,
};
use crate::workbook::{WORKBOOK_FILE, read_workbook};

pub const DASHBOARD_FILE: &str = "dashboard.html";
pub const PREVIEW_ROWS: usize = 10;
/// Preview pages per section; later rows are only in the CSV export.
pub const MAX_PREVIEW_PAGES: usize = 10;

const PAGE_TITLE: &str = "SEO Audit Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    CrawlOverview,
    Indexability,
    OnPageSeo,
    ContentQuality,
    SiteArchitecture,
    Performance,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::CrawlOverview,
        Section::Indexability,
        Section::OnPageSeo,
        Section::ContentQuality,
        Section::SiteArchitecture,
        Section::Performance,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::CrawlOverview => "Crawl Overview",
            Self::Indexability => "Indexability",
            Self::OnPageSeo => "On-Page SEO",
            Self::ContentQuality => "Content Quality",
            Self::SiteArchitecture => "Site Architecture",
            Self::Performance => "Performance",
        }
    }

    pub const fn anchor(self) -> &'static str {
        match self {
            Self::CrawlOverview => "crawl",
            Self::Indexability => "indexability",
            Self::OnPageSeo => "onpage",
            Self::ContentQuality => "content",
            Self::SiteArchitecture => "architecture",
            Self::Performance => "performance",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Open/closed state of every section. All sections start open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionToggles {
    open: [bool; 6],
}

impl Default for SectionToggles {
    fn default() -> Self {
        Self { open: [true; 6] }
    }
}

impl SectionToggles {
    pub fn is_open(&self, section: Section) -> bool {
        self.open[section.index()]
    }

    /// Flips one section and returns its new state. Other sections are
    /// untouched.
    pub fn toggle(&mut self, section: Section) -> bool {
        let slot = &mut self.open[section.index()];
        *slot = !*slot;
        *slot
    }

    pub fn set(&mut self, section: Section, open: bool) {
        self.open[section.index()] = open;
    }
}

/// Where a metric card takes its count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSource {
    /// Row count of a bundle sheet.
    Sheet(&'static str),
    /// Row count of a standalone rule artifact (by file stem).
    Artifact(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct MetricCard {
    pub label: &'static str,
    pub source: CardSource,
    pub tone: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionLayout {
    pub section: Section,
    pub cards: &'static [MetricCard],
    /// Chart file stems.
    pub charts: &'static [&'static str],
    pub preview: &'static str,
    /// Artifact stem offered as the CSV export of the preview.
    pub export: &'static str,
}

const fn sheet_card(label: &'static str, sheet: &'static str, tone: &'static str) -> MetricCard {
    MetricCard {
        label,
        source: CardSource::Sheet(sheet),
        tone,
    }
}

pub const LAYOUT: [SectionLayout; 6] = [
    SectionLayout {
        section: Section::CrawlOverview,
        cards: &[
            sheet_card("HTML Pages", HTML_PAGES_SHEET, "info"),
            sheet_card("4xx Errors", CLIENT_ERRORS_SHEET, "danger"),
            sheet_card("Slow Pages", SLOW_PAGES_SHEET, "warning"),
        ],
        charts: &[STATUS_CODES_CHART],
        preview: CLIENT_ERRORS_SHEET,
        export: "client_errors",
    },
    SectionLayout {
        section: Section::Indexability,
        cards: &[
            MetricCard {
                label: "Non-Indexable Pages",
                source: CardSource::Artifact("non_indexable"),
                tone: "danger",
            },
            sheet_card("Missing Canonical", MISSING_CANONICAL_SHEET, "warning"),
        ],
        charts: &[INDEXABILITY_CHART],
        preview: MISSING_CANONICAL_SHEET,
        export: "missing_canonical",
    },
    SectionLayout {
        section: Section::OnPageSeo,
        cards: &[
            sheet_card("Suboptimal Titles", SUBOPTIMAL_TITLES_SHEET, "warning"),
            sheet_card("Suboptimal Metas", SUBOPTIMAL_METAS_SHEET, "warning"),
        ],
        charts: &[TITLE_LENGTHS_CHART, META_LENGTHS_CHART],
        preview: SUBOPTIMAL_TITLES_SHEET,
        export: "suboptimal_titles",
    },
    SectionLayout {
        section: Section::ContentQuality,
        cards: &[
            sheet_card("Thin Content Pages", THIN_CONTENT_SHEET, "warning"),
            sheet_card("Low Readability Pages", LOW_READABILITY_SHEET, "warning"),
            sheet_card("Near Duplicates", NEAR_DUPLICATES_SHEET, "danger"),
        ],
        charts: &[CONTENT_QUALITY_CHART],
        preview: THIN_CONTENT_SHEET,
        export: "thin_pages",
    },
    SectionLayout {
        section: Section::SiteArchitecture,
        cards: &[
            sheet_card("Deep Pages", DEEP_PAGES_SHEET, "warning"),
            sheet_card("Low Inlinks", LOW_INLINKS_SHEET, "warning"),
        ],
        charts: &[LINK_CORRELATIONS_CHART],
        preview: DEEP_PAGES_SHEET,
        export: "deep_pages",
    },
    SectionLayout {
        section: Section::Performance,
        cards: &[
            sheet_card("Large Pages", LARGE_PAGES_SHEET, "warning"),
            sheet_card("Outdated Pages", OUTDATED_PAGES_SHEET, "warning"),
            sheet_card("HTTP 1.1 Pages", HTTP11_PAGES_SHEET, "warning"),
        ],
        charts: &[PAGE_SIZE_CHART],
        preview: LARGE_PAGES_SHEET,
        export: "large_pages",
    },
];


/// Everything the dashboard reads from a reports directory.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub bundle: OutputBundle,
    /// Row counts of standalone artifacts; `None` when the file is absent.
    pub artifact_counts: BTreeMap<&'static str, Option<usize>>,
    /// Whether each chart image exists, by chart stem.
    pub charts: BTreeMap<&'static str, bool>,
    /// Whether each preview export exists, by artifact stem.
    pub exports: BTreeMap<&'static str, bool>,
    /// Prepended to image and export links; empty when the dashboard sits
    /// in the reports directory.
    pub asset_prefix: String,
}

impl DashboardData {
    /// Loads the workbook and every referenced artifact. A missing or
    /// unreadable workbook is an error; missing charts or exports are
    /// reported and skipped.
    pub fn load(reports_dir: &Path) -> Result<Self> {
        let bundle = read_workbook(&reports_dir.join(WORKBOOK_FILE))?;
        let mut data = Self {
            bundle,
            ..Self::default()
        };
        for layout in &LAYOUT {
            for card in layout.cards {
                if let CardSource::Artifact(stem) = card.source {
                    let path = reports_dir.join(artifact_file(stem));
                    let count = count_csv_rows(&path)?;
                    if count.is_none() {
                        warn!(path = %path.display(), "artifact not found");
                    }
                    data.artifact_counts.insert(stem, count);
                }
            }
            for chart in layout.charts {
                let path = reports_dir.join(chart_image_file(chart));
                let present = path.is_file();
                if !present {
                    warn!(path = %path.display(), "chart image not found");
                }
                data.charts.insert(*chart, present);
            }
            let export = reports_dir.join(artifact_file(layout.export));
            let present = export.is_file();
            if !present {
                warn!(path = %export.display(), "preview export not found");
            }
            data.exports.insert(layout.export, present);
        }
        Ok(data)
    }

    fn card_value(&self, source: CardSource) -> Option<usize> {
        match source {
            CardSource::Sheet(name) => self.bundle.row_count(name),
            CardSource::Artifact(stem) => self.artifact_counts.get(stem).copied().flatten(),
        }
    }

    fn asset(&self, file: &str) -> String {
        format!("{}{file}", self.asset_prefix)
    }
}

fn count_csv_rows(path: &Path) -> Result<Option<usize>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path).map_err(|source| ReportError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut count = 0;
    for record in reader.records() {
        record.map_err(|source| ReportError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        count += 1;
    }
    Ok(Some(count))
}

/// Outcome of [`write_dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    Rendered,
    /// The reports could not be loaded; an error notice page was written
    /// instead.
    ErrorNotice,
}

/// Renders the dashboard for `reports_dir` into `output`. Any failure to
/// load the reports produces the error notice page.
pub fn write_dashboard(
    reports_dir: &Path,
    output: &Path,
    toggles: &SectionToggles,
) -> Result<DashboardStatus> {
    let output_dir = output.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = output_dir {
        fs::create_dir_all(parent).map_err(|source| ReportError::io(parent, source))?;
    }
    let rendered = match DashboardData::load(reports_dir) {
        Ok(mut data) => {
            data.asset_prefix = asset_prefix(reports_dir, output_dir.unwrap_or(Path::new(".")));
            render_dashboard(&data, toggles).map(|html| (html, DashboardStatus::Rendered))
        }
        Err(err) => {
            warn!(error = %err, "rendering error notice instead of dashboard");
            render_error_page(&err).map(|html| (html, DashboardStatus::ErrorNotice))
        }
    };
    let (html, status) = rendered.map_err(|source| ReportError::io(output, source))?;
    fs::write(output, html).map_err(|source| ReportError::io(output, source))?;
    info!(path = %output.display(), ?status, "dashboard written");
    Ok(status)
}

/// Links are relative when the dashboard is written into the reports
/// directory, absolute otherwise.
fn asset_prefix(reports_dir: &Path, output_dir: &Path) -> String {
    match (fs::canonicalize(reports_dir), fs::canonicalize(output_dir)) {
        (Ok(reports), Ok(output)) if reports == output => String::new(),
        (Ok(reports), _) => format!("{}/", reports.display()),
        (Err(_), _) => format!("{}/", reports_dir.display()),
    }
}

pub fn render_dashboard(data: &DashboardData, toggles: &SectionToggles) -> io::Result<String> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    open_page(&mut xml)?;
    text_element(&mut xml, "h1", PAGE_TITLE)?;
    for layout in &LAYOUT {
        write_section(&mut xml, data, layout, toggles.is_open(layout.section))?;
    }
    close_page(xml)
}

/// Static page shown when the reports could not be loaded.
pub fn render_error_page(error: &ReportError) -> io::Result<String> {
    let heading = match error {
        ReportError::MissingArtifact { .. } => "Error: Missing data files.",
        _ => "Error: Unreadable data files.",
    };
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    open_page(&mut xml)?;
    text_element(&mut xml, "h1", heading)?;
    notice(&mut xml, &error.to_string())?;
    xml.write_event(Event::Start(BytesStart::new("p")))?;
    xml.write_event(Event::Text(BytesText::new("Run ")))?;
    text_element(&mut xml, "code", "seo-audit run <CRAWL_CSV>")?;
    xml.write_event(Event::Text(BytesText::new(" to generate the reports.")))?;
    xml.write_event(Event::End(BytesEnd::new("p")))?;
    close_page(xml)
}

fn open_page<W: Write>(xml: &mut Writer<W>) -> io::Result<()> {
    xml.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    let mut html = BytesStart::new("html");
    html.push_attribute(("lang", "en"));
    xml.write_event(Event::Start(html))?;
    xml.write_event(Event::Start(BytesStart::new("head")))?;
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("charset", "utf-8"));
    xml.write_event(Event::Empty(meta))?;
    text_element(xml, "title", PAGE_TITLE)?;
    xml.write_event(Event::Start(BytesStart::new("style")))?;
    xml.write_event(Event::Text(BytesText::from_escaped(STYLE)))?;
    xml.write_event(Event::End(BytesEnd::new("style")))?;
    xml.write_event(Event::End(BytesEnd::new("head")))?;
    xml.write_event(Event::Start(BytesStart::new("body")))
}

fn close_page(mut xml: Writer<Vec<u8>>) -> io::Result<String> {
    xml.write_event(Event::End(BytesEnd::new("body")))?;
    xml.write_event(Event::End(BytesEnd::new("html")))?;
    let mut bytes = xml.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(io::Error::other)
}

fn write_section<W: Write>(
    xml: &mut Writer<W>,
    data: &DashboardData,
    layout: &SectionLayout,
    open: bool,
) -> io::Result<()> {
    let section = layout.section;
    let mut details = BytesStart::new("details");
    details.push_attribute(("id", section.anchor()));
    details.push_attribute(("class", "section"));
    if open {
        details.push_attribute(("open", "open"));
    }
    xml.write_event(Event::Start(details))?;
    xml.write_event(Event::Start(BytesStart::new("summary")))?;
    text_element(xml, "h2", section.title())?;
    xml.write_event(Event::End(BytesEnd::new("summary")))?;

    start_div(xml, "cards")?;
    for card in layout.cards {
        let value = data
            .card_value(card.source)
            .map_or_else(|| "n/a".to_string(), |count| count.to_string());
        start_div(xml, &format!("card {}", card.tone))?;
        text_element(xml, "h4", card.label)?;
        text_element(xml, "p", &value)?;
        end_div(xml)?;
    }
    end_div(xml)?;

    start_div(xml, "row")?;
    start_div(xml, "charts")?;
    for chart in layout.charts {
        write_chart(xml, data, chart)?;
    }
    end_div(xml)?;
    start_div(xml, "preview")?;
    write_preview(xml, data, layout)?;
    end_div(xml)?;
    end_div(xml)?;
    xml.write_event(Event::End(BytesEnd::new("details")))
}

fn write_chart<W: Write>(xml: &mut Writer<W>, data: &DashboardData, stem: &str) -> io::Result<()> {
    let file = chart_image_file(stem);
    if !data.charts.get(stem).copied().unwrap_or(false) {
        return notice(xml, &format!("Chart image {file} not found."));
    }
    let src = data.asset(&file);
    xml.write_event(Event::Start(BytesStart::new("figure")))?;
    let mut img = BytesStart::new("img");
    img.push_attribute(("src", src.as_str()));
    img.push_attribute(("alt", stem));
    img.push_attribute(("class", "chart"));
    xml.write_event(Event::Empty(img))?;
    xml.write_event(Event::End(BytesEnd::new("figure")))
}

/// First page of the sheet inline, later pages folded, export link on top.
fn write_preview<W: Write>(
    xml: &mut Writer<W>,
    data: &DashboardData,
    layout: &SectionLayout,
) -> io::Result<()> {
    let Some(sheet) = data.bundle.sheet(layout.preview) else {
        return notice(xml, &format!("Sheet {} not found.", layout.preview));
    };
    text_element(xml, "h3", &sheet.name)?;
    if data.exports.get(layout.export).copied().unwrap_or(false) {
        let file = artifact_file(layout.export);
        let href = data.asset(&file);
        let mut para = BytesStart::new("p");
        para.push_attribute(("class", "export"));
        xml.write_event(Event::Start(para))?;
        let mut link = BytesStart::new("a");
        link.push_attribute(("href", href.as_str()));
        link.push_attribute(("download", file.as_str()));
        xml.write_event(Event::Start(link))?;
        xml.write_event(Event::Text(BytesText::new(&format!("Export {file}"))))?;
        xml.write_event(Event::End(BytesEnd::new("a")))?;
        xml.write_event(Event::End(BytesEnd::new("p")))?;
    }

    let columns = &sheet.table.columns;
    let mut pages = sheet.table.pages(PREVIEW_ROWS).take(MAX_PREVIEW_PAGES);
    write_table(xml, columns, pages.next().unwrap_or_default())?;
    for (idx, page) in pages.enumerate() {
        let first = (idx + 1) * PREVIEW_ROWS + 1;
        let last = first + page.len() - 1;
        let mut details = BytesStart::new("details");
        details.push_attribute(("class", "page"));
        xml.write_event(Event::Start(details))?;
        text_element(xml, "summary", &format!("Rows {first}-{last}"))?;
        write_table(xml, columns, page)?;
        xml.write_event(Event::End(BytesEnd::new("details")))?;
    }
    let hidden = sheet.table.len().saturating_sub(PREVIEW_ROWS * MAX_PREVIEW_PAGES);
    if hidden > 0 {
        text_element(xml, "p", &format!("{hidden} more rows not shown."))?;
    }
    Ok(())
}

fn write_table<W: Write>(xml: &mut Writer<W>, columns: &[String], rows: &[Vec<Value>]) -> io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new("table")))?;
    xml.write_event(Event::Start(BytesStart::new("thead")))?;
    xml.write_event(Event::Start(BytesStart::new("tr")))?;
    for column in columns {
        text_element(xml, "th", column)?;
    }
    xml.write_event(Event::End(BytesEnd::new("tr")))?;
    xml.write_event(Event::End(BytesEnd::new("thead")))?;
    xml.write_event(Event::Start(BytesStart::new("tbody")))?;
    for row in rows {
        xml.write_event(Event::Start(BytesStart::new("tr")))?;
        for value in row {
            text_element(xml, "td", &value.to_string())?;
        }
        xml.write_event(Event::End(BytesEnd::new("tr")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("tbody")))?;
    xml.write_event(Event::End(BytesEnd::new("table")))
}

/// `<name>text</name>` on one line. The text event also keeps empty
/// elements from collapsing into `<name/>`.
fn text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))
}

fn notice<W: Write>(xml: &mut Writer<W>, message: &str) -> io::Result<()> {
    let mut para = BytesStart::new("p");
    para.push_attribute(("class", "notice"));
    xml.write_event(Event::Start(para))?;
    xml.write_event(Event::Text(BytesText::new(message)))?;
    xml.write_event(Event::End(BytesEnd::new("p")))
}

fn start_div<W: Write>(xml: &mut Writer<W>, class: &str) -> io::Result<()> {
    let mut div = BytesStart::new("div");
    div.push_attribute(("class", class));
    xml.write_event(Event::Start(div))
}

fn end_div<W: Write>(xml: &mut Writer<W>) -> io::Result<()> {
    xml.write_event(Event::End(BytesEnd::new("div")))
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;}\
h1{text-align:center;}\
.section{border:1px solid #ddd;border-radius:6px;margin-bottom:1.5rem;padding:0 1rem;}\
.section summary{cursor:pointer;}\
.section summary h2{display:inline;}\
.cards{display:flex;flex-wrap:wrap;gap:1rem;margin:1rem 0;}\
.card{flex:1 1 12rem;text-align:center;border-radius:6px;padding:.5rem;color:#fff;}\
.card p{font-size:2rem;margin:.25rem 0;}\
.info{background:#17a2b8;}.danger{background:#dc3545;}.warning{background:#e0a800;}\
.row{display:flex;flex-wrap:wrap;gap:1rem;}\
.charts,.preview{flex:1 1 28rem;overflow-x:auto;}\
.chart{max-width:100%;height:auto;}\
.page summary{cursor:pointer;margin:.5rem 0;}\
table{border-collapse:collapse;font-size:.85rem;}\
th,td{border:1px solid #ddd;padding:.25rem .5rem;text-align:left;}\
.notice{color:#a94442;}";
