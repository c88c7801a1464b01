//! Integration tests for the crawler
//!
//! Most scenarios drive the full state machine through a scripted in-memory
//! browser session on a paused clock, so pacing sleeps cost nothing. The
//! last one uses wiremock and the HTTP backend end-to-end.

use async_trait::async_trait;
use listing_harvester::config::{Backend, BrowserConfig, Config, CrawlerConfig, DelayRange};
use listing_harvester::crawler::{run_crawl, CrawlOutcome, CrawlRequest};
use listing_harvester::progress::Progress;
use listing_harvester::session::{
    open_session, BrowserSession, SessionError, SessionResult, Visibility,
};
use listing_harvester::{SiteProfile, UNAVAILABLE};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://empresite.eleconomista.es/localidad/COSLADA-MADRID/";
const PAGE_2: &str = "https://empresite.eleconomista.es/localidad/COSLADA-MADRID/PgNum-2/";
const PAGE_3: &str = "https://empresite.eleconomista.es/localidad/COSLADA-MADRID/PgNum-3/";

/// What the scripted session observed
#[derive(Debug, Default)]
struct SessionLog {
    navigations: Vec<String>,
    visibility: Vec<Visibility>,
    shutdown_calls: usize,
}

/// Browser session serving canned pages keyed by URL
///
/// Each URL maps to a queue of contents; every read pops the front until a
/// single entry is left, which is then returned forever.
struct ScriptedSession {
    pages: HashMap<String, VecDeque<String>>,
    current: Option<String>,
    log: Arc<Mutex<SessionLog>>,
    stop_after: Option<(String, Arc<AtomicBool>)>,
}

impl ScriptedSession {
    fn new(log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            pages: HashMap::new(),
            current: None,
            log,
            stop_after: None,
        }
    }

    fn page(mut self, url: &str, contents: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            contents.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Raises `flag` once `url` has been navigated to
    fn stop_after(mut self, url: &str, flag: Arc<AtomicBool>) -> Self {
        self.stop_after = Some((url.to_string(), flag));
        self
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn navigate(&mut self, url: &Url) -> SessionResult<()> {
        let key = url.to_string();
        self.log.lock().unwrap().navigations.push(key.clone());

        if let Some((target, flag)) = &self.stop_after {
            if *target == key {
                flag.store(true, Ordering::SeqCst);
            }
        }

        if !self.pages.contains_key(&key) {
            self.current = None;
            return Err(SessionError::Navigation {
                url: key,
                reason: "no scripted page".to_string(),
            });
        }
        self.current = Some(key);
        Ok(())
    }

    async fn wait_for_root(&mut self, _timeout: Duration) -> SessionResult<()> {
        Ok(())
    }

    async fn dismiss_consent(
        &mut self,
        _phrases: &[String],
        _timeout: Duration,
    ) -> SessionResult<bool> {
        Ok(false)
    }

    async fn scroll_to(&mut self, _y: u32) -> SessionResult<()> {
        Ok(())
    }

    async fn content(&mut self) -> SessionResult<String> {
        let key = self.current.clone().ok_or(SessionError::NoPage)?;
        let queue = self.pages.get_mut(&key).ok_or(SessionError::NoPage)?;
        let content = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(content)
    }

    async fn set_visibility(&mut self, visibility: Visibility) -> SessionResult<()> {
        self.log.lock().unwrap().visibility.push(visibility);
        Ok(())
    }

    async fn shutdown(&mut self) -> SessionResult<()> {
        self.log.lock().unwrap().shutdown_calls += 1;
        Ok(())
    }
}

fn detail_url(slug: &str) -> String {
    format!("https://empresite.eleconomista.es/{}.html", slug)
}

fn results_page(slugs: &[&str]) -> String {
    let anchors: String = slugs
        .iter()
        .map(|slug| format!(r#"<a href="/{}.html">Ver ficha</a>"#, slug))
        .collect();
    format!(
        r#"<html><body><a href="/faqs.html">FAQ</a>{}</body></html>"#,
        anchors
    )
}

fn detail_page(name: &str, phone: &str) -> String {
    format!(
        r#"<html><body>
            <h1 itemprop="name">{}</h1>
            <a href="tel:{}">Llamar</a>
            <span itemprop="streetAddress">Avenida de la Constitución 3</span>
            <span itemprop="postalCode">28820</span>
        </body></html>"#,
        name, phone
    )
}

const EMPTY_RESULTS: &str = "<html><body><p>Sin resultados</p></body></html>";
const CHALLENGE: &str = r#"<html><body><div class="g-recaptcha"></div></body></html>"#;

/// Two pages of listings with one repeat, then a page without anchors
fn two_page_site(log: Arc<Mutex<SessionLog>>) -> ScriptedSession {
    ScriptedSession::new(log)
        .page(BASE, &[&results_page(&["ALFA-SL", "BETA-SA", "GAMMA-SL"])])
        .page(PAGE_2, &[&results_page(&["GAMMA-SL", "DELTA-SL"])])
        .page(PAGE_3, &[EMPTY_RESULTS])
        .page(&detail_url("ALFA-SL"), &[&detail_page("Alfa S.L.", "911111111")])
        .page(&detail_url("BETA-SA"), &[&detail_page("Beta S.A.", "922222222")])
        .page(&detail_url("GAMMA-SL"), &[&detail_page("Gamma S.L.", "933333333")])
        .page(&detail_url("DELTA-SL"), &[&detail_page("Delta S.L.", "944444444")])
}

fn blocking_config() -> Config {
    let mut config = Config::default();
    config.blocking.enabled = true;
    config
}

fn request(max_pages: u32) -> CrawlRequest {
    CrawlRequest::new(BASE, max_pages, false, None).unwrap()
}

fn names(report: &listing_harvester::CrawlReport) -> Vec<String> {
    report
        .records
        .iter()
        .map(|r| r.name.as_str().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_crawl_until_results_run_out() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let session = two_page_site(Arc::clone(&log));
    let (progress, mut lines) = Progress::channel();

    let started = tokio::time::Instant::now();
    let report = run_crawl(
        &Config::default(),
        &request(5),
        Box::new(session),
        progress,
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    assert_eq!(names(&report), vec!["Alfa S.L.", "Beta S.A.", "Gamma S.L.", "Delta S.L."]);
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.details_processed, 5);

    // One cooldown, after the fourth detail page
    let mut seen = Vec::new();
    while let Ok(line) = lines.try_recv() {
        seen.push(line);
    }
    let cooldowns: Vec<_> = seen.iter().filter(|l| l.contains("Cooling down")).collect();
    assert_eq!(cooldowns.len(), 1);
    assert!(cooldowns[0].contains("Cooling down after 4 detail pages"));
    assert!(started.elapsed() >= Duration::from_secs(45));

    assert_eq!(report.page_batches.len(), 3);
    assert_eq!(report.page_batches[0].records.len(), 3);
    assert_eq!(report.page_batches[1].records.len(), 1);
    assert!(report.page_batches[2].records.is_empty());

    let first = &report.records[0];
    assert_eq!(first.phone.as_str(), "+34911111111");
    assert_eq!(first.locality.as_str(), "Coslada Madrid");
    assert_eq!(first.detail_url.as_deref(), Some(detail_url("ALFA-SL").as_str()));
    assert_eq!(first.email.as_str(), UNAVAILABLE);
    assert_eq!(first.inferred_email_info.as_str(), UNAVAILABLE);

    let log = log.lock().unwrap();
    assert!(!log.navigations.iter().any(|n| n.ends_with("faqs.html")));
    assert_eq!(log.shutdown_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_footer_links_only_ends_results() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let session = two_page_site(Arc::clone(&log)).page(PAGE_2, &[&results_page(&[])]);

    let report = run_crawl(
        &Config::default(),
        &request(5),
        Box::new(session),
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    assert_eq!(names(&report), vec!["Alfa S.L.", "Beta S.A.", "Gamma S.L."]);
    assert_eq!(report.pages_visited, 2);

    let log = log.lock().unwrap();
    assert!(!log.navigations.contains(&PAGE_3.to_string()));
    assert!(!log.navigations.iter().any(|n| n.ends_with("faqs.html")));
}

#[tokio::test(start_paused = true)]
async fn test_page_bound_stops_crawl() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let session = two_page_site(Arc::clone(&log));

    let report = run_crawl(
        &Config::default(),
        &request(1),
        Box::new(session),
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.pages_visited, 1);
    assert!(!log.lock().unwrap().navigations.contains(&PAGE_2.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_block_cleared_after_two_polls() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let page_2 = results_page(&["GAMMA-SL", "DELTA-SL"]);
    let session = two_page_site(Arc::clone(&log)).page(PAGE_2, &[CHALLENGE, CHALLENGE, &page_2]);
    let (progress, mut lines) = Progress::channel();

    let report = run_crawl(
        &blocking_config(),
        &request(5),
        Box::new(session),
        progress,
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    assert_eq!(report.records.len(), 4);

    let mut seen = Vec::new();
    while let Ok(line) = lines.try_recv() {
        seen.push(line);
    }
    assert!(seen.iter().any(|l| l.contains("after 2 checks")));

    let log = log.lock().unwrap();
    // Hidden at start, shown for the challenge, hidden again once cleared
    assert_eq!(
        log.visibility,
        vec![Visibility::Hidden, Visibility::Visible, Visibility::Hidden]
    );
    assert_eq!(log.shutdown_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_block_keeps_earlier_results() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let session = two_page_site(Arc::clone(&log)).page(PAGE_2, &[CHALLENGE]);

    let started = tokio::time::Instant::now();
    let report = run_crawl(
        &blocking_config(),
        &request(5),
        Box::new(session),
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Terminated);
    assert_eq!(names(&report), vec!["Alfa S.L.", "Beta S.A.", "Gamma S.L."]);
    assert!(started.elapsed() >= Duration::from_secs(240));

    let log = log.lock().unwrap();
    assert!(!log.navigations.contains(&PAGE_3.to_string()));
    assert_eq!(log.shutdown_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_list_page_terminates() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let session = ScriptedSession::new(Arc::clone(&log));

    let report = run_crawl(
        &Config::default(),
        &request(3),
        Box::new(session),
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Terminated);
    assert!(report.records.is_empty());
    assert_eq!(log.lock().unwrap().shutdown_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_detail_fallbacks_and_inferred_emails() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let acme = r#"<html><body>
        <a href="tel:+34 915 55 55 55">Llamar</a>
        <a class="url" href="http://acme.example/">Web</a>
        <span itemprop="addressLocality">San Fernando de Henares</span>
    </body></html>"#;
    let session = ScriptedSession::new(Arc::clone(&log))
        .page(BASE, &[&results_page(&["ACME-SOLUCIONES-SL", "MISSING-SL"])])
        .page(&detail_url("ACME-SOLUCIONES-SL"), &[acme]);

    let report = run_crawl(
        &Config::default(),
        &request(1),
        Box::new(session),
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    // The unreachable detail page is skipped but still counted
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.details_processed, 2);

    let acme = &report.records[0];
    assert_eq!(acme.name.as_str(), "Acme Soluciones Sl");
    assert_eq!(acme.locality.as_str(), "San Fernando de Henares");
    assert_eq!(acme.website.as_str(), "http://acme.example/");
    assert_eq!(acme.inferred_email_info.as_str(), "info@acme.example");
    assert_eq!(acme.inferred_email_contact.as_str(), "contacto@acme.example");
    assert_eq!(acme.inferred_email_admin.as_str(), "administracion@acme.example");
}

#[tokio::test(start_paused = true)]
async fn test_stop_flag_ends_crawl() {
    let log = Arc::new(Mutex::new(SessionLog::default()));
    let stop = Arc::new(AtomicBool::new(false));
    let session = two_page_site(Arc::clone(&log)).stop_after(PAGE_2, Arc::clone(&stop));

    let report = run_crawl(
        &Config::default(),
        &request(5),
        Box::new(session),
        Progress::silent(),
        stop,
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Stopped);
    assert_eq!(report.records.len(), 3);

    let log = log.lock().unwrap();
    assert!(!log.navigations.contains(&detail_url("DELTA-SL")));
    assert_eq!(log.shutdown_calls, 1);
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        detail_delay_secs: DelayRange(0.0, 0.0),
        page_delay_secs: DelayRange(0.0, 0.0),
        cooldown_every: 4,
        cooldown_secs: DelayRange(0.0, 0.0),
    };
    config.browser = BrowserConfig {
        backend: Backend::Http,
        settle_delay_secs: DelayRange(0.0, 0.0),
        ready_timeout_secs: 5,
        ..BrowserConfig::default()
    };
    config.site.profile = Some(SiteProfile::PaginasAmarillas);
    config
}

#[tokio::test]
async fn test_http_backend_inline_listings() {
    let server = MockServer::start().await;
    let search = "/search/fontaneros/all-ma/madrid/all-is/madrid/all-ba/all-pu/all-nc";

    let page_1 = r#"<html><body>
        <div class="box">
          <span itemprop="name">Fontanería Pérez</span>
          <a href="tel:912000111">Llamar</a>
          <a class="web" href="https://www.fontaneriaperez.es/?utm_source=pa">Web</a>
          <span itemprop="postalCode">28001</span>
        </div>
        <div class="box">
          <span itemprop="name">Desatascos Rápidos</span>
          <p>Escríbenos a hola@desatascosrapidos.com</p>
        </div>
        <div class="box"><span>Publicidad</span></div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path(format!("{}/1", search)))
        .and(query_param("what", "fontaneros"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_1))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/2", search)))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&server)
        .await;

    let config = fast_config();
    let raw = format!("{}{}/1?what=fontaneros&where=madrid", server.uri(), search);
    let request = CrawlRequest::new(&raw, 3, false, config.site.profile).unwrap();
    let session = open_session(&config.browser).await.unwrap();
    assert_eq!(session.name(), "http");

    let report = run_crawl(
        &config,
        &request,
        session,
        Progress::silent(),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    assert_eq!(report.outcome, CrawlOutcome::Finished);
    assert_eq!(report.facets.category.as_str(), "fontaneros");
    assert_eq!(report.records.len(), 2);

    let perez = &report.records[0];
    assert_eq!(perez.name.as_str(), "Fontanería Pérez");
    assert_eq!(perez.phone.as_str(), "+34912000111");
    assert_eq!(perez.website.as_str(), "https://www.fontaneriaperez.es/");
    assert_eq!(perez.locality.as_str(), "madrid");
    assert_eq!(perez.inferred_email_contact.as_str(), "contacto@fontaneriaperez.es");
    assert!(perez.detail_url.is_none());

    let rapidos = &report.records[1];
    assert_eq!(rapidos.email.as_str(), "hola@desatascosrapidos.com");
    assert_eq!(rapidos.inferred_email_info.as_str(), UNAVAILABLE);
}
