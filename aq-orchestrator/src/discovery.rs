use aq_agent::{AgentInput, AuthenticationAgent, ElementDiscoveryAgent, FormAnalysisAgent, PageUnderstandingAgent};
use aq_core::{AgentTimelineEntry, CrawlContext, DataInput, InteractionPoint, NavigationElement, PageAnalysis, PageType};
use aq_crawler::CrawledPage;
use aq_llm::Gateway;
use chrono::Utc;

pub struct PageOutcome {
    pub analysis: PageAnalysis,
    pub timeline: Vec<AgentTimelineEntry>,
    pub warnings: Vec<String>,
}

/// Runs the four page-level agents concurrently over one crawled page and
/// merges their outputs into a single `PageAnalysis`. A failing agent is
/// recorded as a warning and the corresponding part of the analysis is left
/// at its default rather than aborting the whole page.
#[tracing::instrument(skip(gateway, page, context), fields(url = %page.url))]
pub async fn analyze_page(gateway: &Gateway, page: &CrawledPage, context: &CrawlContext) -> PageOutcome {
    let input = AgentInput::new(page.url.clone(), page.title.clone(), page.html.clone(), context);

    let understanding = PageUnderstandingAgent.analyze(gateway, &input);
    let elements = ElementDiscoveryAgent.analyze(gateway, &input);
    let auth = AuthenticationAgent.analyze(gateway, &input);
    let forms = FormAnalysisAgent.analyze(gateway, &input);

    let started = Utc::now();
    let (understanding, elements, auth, forms) = tokio::join!(understanding, elements, auth, forms);
    let ended = Utc::now();

    let mut warnings = Vec::new();
    let mut timeline = Vec::new();

    let mut page_type = PageType::Other;
    let mut purpose = String::new();
    record(&mut timeline, "PageUnderstanding", &page.url, started, ended, &understanding, &mut warnings);
    if let Ok(output) = understanding {
        page_type = output.page_type;
        purpose = output.purpose;
    }

    let mut elements_out = Vec::new();
    record(&mut timeline, "ElementDiscovery", &page.url, started, ended, &elements, &mut warnings);
    if let Ok(output) = elements {
        elements_out = output.elements;
    }

    record(&mut timeline, "Authentication", &page.url, started, ended, &auth, &mut warnings);
    if let Ok(output) = auth {
        if output.has_auth {
            page_type = PageType::Auth;
        }
    }

    let mut data_inputs = Vec::new();
    record(&mut timeline, "FormAnalysis", &page.url, started, ended, &forms, &mut warnings);
    if let Ok(output) = forms {
        data_inputs.extend(output.fields.into_iter().map(|f| DataInput { selector: f.selector, label: f.label, input_kind: f.input_kind, required: f.required }));
    }

    let mut interactions = Vec::new();
    let mut navigation = Vec::new();
    for element in &elements_out {
        interactions.push(InteractionPoint { selector: element.primary_selector.clone(), action: interaction_action(element), description: element.purpose.clone() });
        if element.is_input() {
            data_inputs.push(DataInput {
                selector: element.primary_selector.clone(),
                label: element.label.clone(),
                input_kind: element.element_type.clone(),
                required: false,
            });
        }
        if element.is_link() {
            navigation.push(NavigationElement { selector: element.primary_selector.clone(), destination_hint: element.purpose.clone() });
        }
    }

    let analysis = PageAnalysis {
        url: page.url.clone(),
        title: page.title.clone(),
        page_type,
        purpose,
        elements: elements_out,
        interactions,
        data_inputs,
        navigation,
        accessibility_issues: None,
        dom_fingerprint: page.dom_fingerprint.clone(),
        load_latency: page.load_latency,
        analyzed_at: ended,
    };

    PageOutcome { analysis, timeline, warnings }
}

fn interaction_action(element: &aq_core::SemanticElement) -> String {
    if element.is_input() {
        "fill".to_string()
    } else if element.is_link() {
        "navigate".to_string()
    } else {
        "click".to_string()
    }
}

fn record<T>(
    timeline: &mut Vec<AgentTimelineEntry>,
    agent: &str,
    url: &str,
    started: chrono::DateTime<Utc>,
    ended: chrono::DateTime<Utc>,
    result: &std::result::Result<T, aq_agent::Error>,
    warnings: &mut Vec<String>,
) {
    let (success, error) = match result {
        Ok(_) => (true, None),
        Err(e) => {
            let message = format!("{agent} failed for {url}: {e}");
            warnings.push(message.clone());
            (false, Some(message))
        }
    };
    timeline.push(AgentTimelineEntry {
        agent: agent.to_string(),
        url: url.to_string(),
        started_at: started,
        ended_at: ended,
        duration: (ended - started).to_std().unwrap_or_default(),
        success,
        error,
    });
}
