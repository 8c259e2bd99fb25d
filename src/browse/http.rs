//! HTTP-only page adapter.
//!
//! Emulates the few interactions the registry search needs without a real
//! browser: a click on an element carrying `data-*` attributes posts those
//! attributes (the registry opens its detail overlay this way), any other
//! click submits the surrounding form with the filled values. The request is
//! sent to the URL the caller expects the response from, resolved against the
//! current page.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};

use super::{Browser, Page, ResponseMatch};

const USER_AGENT: &str = concat!("judgment-monitor/", env!("CARGO_PKG_VERSION"));

pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    /// `request_timeout` bounds every request, navigation included.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage::new(self.client.clone())))
    }
}

pub struct HttpPage {
    client: Client,
    url: Option<Url>,
    document: String,
    layer: Option<String>,
    filled: Vec<(String, String)>,
}

impl HttpPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: None,
            document: String::new(),
            layer: None,
            filled: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("navigate to {url}"))?
            .error_for_status()
            .with_context(|| format!("navigate to {url}"))?;
        let final_url = resp.url().clone();
        let body = resp.text().await.context("read page body")?;

        self.url = Some(final_url);
        self.document = body;
        self.layer = None;
        self.filled.clear();
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let name = input_name(&self.document, selector)?;
        self.filled.retain(|(n, _)| *n != name);
        self.filled.push((name, value.to_string()));
        Ok(())
    }

    async fn click_and_await(&mut self, selector: &str, expect: &ResponseMatch) -> Result<String> {
        let base = self
            .url
            .clone()
            .ok_or_else(|| anyhow!("click on {selector} before any navigation"))?;
        let plan = plan_click(&self.document, selector, &self.filled)?;
        let target = plan.target(&base, expect)?;

        let resp = self
            .client
            .post(target.clone())
            .form(&plan.fields)
            .send()
            .await
            .with_context(|| format!("post {target}"))?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await.context("read response body")?;

        if !expect.matches(&final_url, status) {
            bail!("unexpected response {status} from {final_url}");
        }

        match plan.kind {
            ClickKind::Submit => {
                self.document = body.clone();
                self.layer = None;
            }
            ClickKind::Overlay => self.layer = Some(body.clone()),
        }
        Ok(body)
    }

    async fn content(&mut self) -> Result<String> {
        Ok(match &self.layer {
            Some(layer) => format!("{}{}", self.document, layer),
            None => self.document.clone(),
        })
    }

    async fn reset_interaction_surface(&mut self) -> Result<()> {
        self.layer = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickKind {
    Submit,
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClickPlan {
    kind: ClickKind,
    fields: Vec<(String, String)>,
    action: Option<String>,
}

impl ClickPlan {
    fn target(&self, base: &Url, expect: &ResponseMatch) -> Result<Url> {
        if let Some(action) = self.action.as_deref().filter(|a| a.contains(&expect.url_contains)) {
            return base.join(action).with_context(|| format!("resolve form action {action}"));
        }
        let rel = expect.url_contains.trim_start_matches('/');
        base.join(rel)
            .with_context(|| format!("resolve {rel} against {base}"))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector {selector}: {e}"))
}

fn input_name(html: &str, selector: &str) -> Result<String> {
    let sel = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    let el = doc
        .select(&sel)
        .next()
        .ok_or_else(|| anyhow!("no element matches {selector}"))?;
    el.value()
        .attr("name")
        .or_else(|| el.value().attr("id"))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{selector} has neither name nor id"))
}

fn plan_click(html: &str, selector: &str, filled: &[(String, String)]) -> Result<ClickPlan> {
    let sel = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    let el = doc
        .select(&sel)
        .next()
        .ok_or_else(|| anyhow!("no element matches {selector}"))?;

    let data: Vec<(String, String)> = el
        .value()
        .attrs()
        .filter_map(|(k, v)| k.strip_prefix("data-").map(|k| (k.to_string(), v.to_string())))
        .collect();
    if !data.is_empty() {
        return Ok(ClickPlan {
            kind: ClickKind::Overlay,
            fields: data,
            action: None,
        });
    }

    let form = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "form");
    let mut fields = match form {
        Some(f) => form_fields(f),
        None => form_fields(doc.root_element()),
    };
    for (name, value) in filled {
        fields.retain(|(n, _)| n != name);
        fields.push((name.clone(), value.clone()));
    }

    Ok(ClickPlan {
        kind: ClickKind::Submit,
        fields,
        action: form.and_then(|f| f.value().attr("action")).map(str::to_string),
    })
}

/// Successful controls under `scope`, as a browser would submit them.
fn form_fields(scope: ElementRef<'_>) -> Vec<(String, String)> {
    static CONTROLS: once_cell::sync::Lazy<Selector> = once_cell::sync::Lazy::new(|| {
        Selector::parse("input[name], select[name], textarea[name]").unwrap()
    });

    let mut out = Vec::new();
    for c in scope.select(&CONTROLS) {
        let v = c.value();
        let Some(name) = v.attr("name") else { continue };
        let ty = v.attr("type").unwrap_or("text").to_ascii_lowercase();
        match ty.as_str() {
            "submit" | "button" | "image" | "reset" | "file" => continue,
            "checkbox" | "radio" if v.attr("checked").is_none() => continue,
            _ => {}
        }
        let value = match v.name() {
            "textarea" => c.text().collect(),
            _ => v.attr("value").unwrap_or_default().to_string(),
        };
        out.push((name.to_string(), value));
    }
    out
}
