use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hero_slideshow::config::{Configuration, PreloadConfig};
use hero_slideshow::error::PreloadError;
use hero_slideshow::events::{LoadedImage, PreloadEvent};
use hero_slideshow::page_model::{
    Document, ElementId, HeroDescription, PageDescription, SlideDescription, Surface,
};
use hero_slideshow::site::Site;
use hero_slideshow::tasks::preloader::{ImagePreloader, ImageSource, PreloadTask};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn page(images: &[&str]) -> Document {
    PageDescription {
        hero: Some(HeroDescription {
            slides: images
                .iter()
                .map(|url| SlideDescription {
                    image: (!url.is_empty()).then(|| url.to_string()),
                    title: None,
                })
                .collect(),
            ..HeroDescription::default()
        }),
        ..PageDescription::default()
    }
    .build()
}

/// Serves every URL except the ones listed as missing.
#[derive(Default)]
struct FakeSource {
    missing: HashSet<String>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ImageSource for FakeSource {
    fn load(&self, url: &str) -> impl Future<Output = Result<LoadedImage, PreloadError>> + Send {
        let url = url.to_string();
        let missing = self.missing.contains(&url);
        let delay = self.delay;
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak);
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if missing {
                Err(PreloadError::NotFound { url })
            } else {
                Ok(LoadedImage {
                    url,
                    width: 1920,
                    height: 1080,
                })
            }
        }
    }
}

/// Never settles on its own.
struct StalledSource;

impl ImageSource for StalledSource {
    fn load(&self, _url: &str) -> impl Future<Output = Result<LoadedImage, PreloadError>> + Send {
        std::future::pending()
    }
}

#[test]
fn discover_skips_elements_without_url() {
    let doc = page(&["img/a.jpg", "", "img/c.jpg"]);
    let preloader = ImagePreloader::discover(&doc, &PreloadConfig::default());
    let urls: Vec<_> = preloader.tasks().iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, ["img/a.jpg", "img/c.jpg"]);
}

#[tokio::test]
async fn failed_image_does_not_block_the_others() {
    let doc = page(&["img/a.jpg", "img/broken.jpg", "img/c.jpg"]);
    let mut site = Site::mount(doc, &Configuration::default(), Duration::ZERO);
    let preloader = ImagePreloader::discover(site.surface(), &PreloadConfig::default());
    let source = Arc::new(FakeSource {
        missing: HashSet::from(["img/broken.jpg".to_string()]),
        ..FakeSource::default()
    });

    let (tx, mut rx) = mpsc::channel(16);
    let report = preloader.run(source, tx, CancellationToken::new()).await;

    let mut settled = None;
    while let Some(event) = rx.recv().await {
        site.apply_preload(&event);
        if let PreloadEvent::Settled(report) = event {
            settled = Some(report);
        }
    }
    let settled = settled.expect("settled event sent last");
    assert_eq!(settled.settled(), 3);
    assert!(!settled.all_loaded());
    assert_eq!(settled.failures().len(), 1);
    assert_eq!(settled.failures()[0].task.url, "img/broken.jpg");
    assert_eq!(
        settled.failures()[0].error,
        PreloadError::NotFound {
            url: "img/broken.jpg".into()
        }
    );
    assert_eq!(report.loaded.len(), 2);

    let doc = site.surface();
    let backgrounds: Vec<_> = doc
        .query_all(None, ".image-bg")
        .iter()
        .map(|el| doc.style(el, "background-image"))
        .collect();
    assert_eq!(
        backgrounds,
        [
            Some("url(img/a.jpg)".to_string()),
            None,
            Some("url(img/c.jpg)".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn loads_are_bounded_by_max_in_flight() {
    let tasks: Vec<PreloadTask<ElementId>> = page(&["a", "b", "c", "d", "e", "f", "g"])
        .query_all(None, ".image-bg")
        .into_iter()
        .enumerate()
        .map(|(i, element)| PreloadTask {
            element,
            url: format!("img/{i}.jpg"),
        })
        .collect();
    let source = Arc::new(FakeSource {
        delay: Duration::from_millis(50),
        ..FakeSource::default()
    });
    let peak = Arc::clone(&source.peak);

    let (tx, _rx) = mpsc::channel(32);
    let report = ImagePreloader::from_tasks(tasks, 3)
        .run(source, tx, CancellationToken::new())
        .await;

    assert!(report.all_loaded());
    assert_eq!(report.loaded.len(), 7);
    assert_eq!(peak.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn empty_page_settles_immediately() {
    let doc = page(&[]);
    let preloader: ImagePreloader<ElementId> =
        ImagePreloader::discover(&doc, &PreloadConfig::default());
    let (tx, mut rx) = mpsc::channel(4);
    let report = preloader
        .run(Arc::new(FakeSource::default()), tx, CancellationToken::new())
        .await;
    assert_eq!(report.settled(), 0);
    assert!(report.all_loaded());
    assert!(matches!(rx.recv().await, Some(PreloadEvent::Settled(_))));
}

#[tokio::test]
async fn cancellation_aborts_outstanding_loads() {
    let doc = page(&["img/a.jpg", "img/b.jpg", "img/c.jpg"]);
    let mut cfg = PreloadConfig::default();
    cfg.max_concurrent_loads = 2;
    let preloader = ImagePreloader::discover(&doc, &cfg);

    let (tx, _rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(preloader.run(Arc::new(StalledSource), tx, cancel.clone()));
    tokio::task::yield_now().await;
    cancel.cancel();

    let report = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("preloader stops after cancel")
        .expect("preload task panicked");
    assert!(report.loaded.is_empty());
    assert_eq!(report.failed.len(), 3);
    assert!(
        report
            .failed
            .iter()
            .all(|f| matches!(f.error, PreloadError::Aborted { .. }))
    );
}
