use std::time::Duration;

use hero_slideshow::carousel::Phase;
use hero_slideshow::config::Configuration;
use hero_slideshow::events::{LoadedImage, PageInput, PreloadEvent};
use hero_slideshow::page_model::{
    Document, ElementId, HeroDescription, PageDescription, SlideDescription, Surface,
};
use hero_slideshow::site::Site;
use hero_slideshow::tasks::runtime;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn site(slides: usize) -> Site<Document> {
    let doc = PageDescription {
        hero: Some(HeroDescription {
            slides: (0..slides)
                .map(|i| SlideDescription {
                    image: Some(format!("img/hero-{i}.jpg")),
                    title: None,
                })
                .collect(),
            ..HeroDescription::default()
        }),
        ..PageDescription::default()
    }
    .build();
    Site::mount(doc, &Configuration::default(), Duration::ZERO)
}

fn counter(site: &Site<Document>) -> String {
    let doc = site.surface();
    let label = doc.query(None, ".slider-nav-count .current").unwrap();
    doc.text(&label).unwrap()
}

#[tokio::test(start_paused = true)]
async fn rotates_on_the_page_clock() {
    let (_input_tx, input_rx) = mpsc::channel::<PageInput<ElementId>>(8);
    let (_preload_tx, preload_rx) = mpsc::channel::<PreloadEvent<ElementId>>(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runtime::run(
        site(4),
        Instant::now(),
        input_rx,
        preload_rx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(7450)).await;
    cancel.cancel();
    let site = handle.await.unwrap();

    assert_eq!(site.carousel().current_index(), 1);
    assert_eq!(counter(&site), "02");
    assert_eq!(site.carousel().phase(), Phase::Idle);
    assert_eq!(site.next_deadline(), None);
}

#[tokio::test(start_paused = true)]
async fn inputs_and_backgrounds_are_applied() {
    let site = site(4);
    let first_bg = site.surface().query(None, ".image-bg").unwrap();
    let (input_tx, input_rx) = mpsc::channel(8);
    let (preload_tx, preload_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runtime::run(
        site,
        Instant::now(),
        input_rx,
        preload_rx,
        cancel.clone(),
    ));

    preload_tx
        .send(PreloadEvent::Loaded {
            element: first_bg,
            image: LoadedImage {
                url: "img/hero-0.jpg".into(),
                width: 1600,
                height: 900,
            },
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;
    input_tx.send(PageInput::GoTo(3)).await.unwrap();
    input_tx.send(PageInput::Scroll { scroll_y: 250.0 }).await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;

    cancel.cancel();
    let site = handle.await.unwrap();
    let doc = site.surface();

    assert_eq!(site.carousel().current_index(), 3);
    assert_eq!(counter(&site), "04");
    assert_eq!(
        doc.style(&first_bg, "background-image").as_deref(),
        Some("url(img/hero-0.jpg)")
    );
    let header = doc.query(None, ".header").unwrap();
    assert!(doc.has_class(&header, "scrolled"));
    let hero = doc.query(None, ".hero").unwrap();
    assert_eq!(
        doc.style(&hero, "background-position-y").as_deref(),
        Some("125px")
    );
}

#[tokio::test(start_paused = true)]
async fn closed_channels_do_not_stop_the_page() {
    let (input_tx, input_rx) = mpsc::channel::<PageInput<ElementId>>(1);
    let (preload_tx, preload_rx) = mpsc::channel::<PreloadEvent<ElementId>>(1);
    drop(input_tx);
    drop(preload_tx);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runtime::run(
        site(2),
        Instant::now(),
        input_rx,
        preload_rx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(8500)).await;
    assert!(!handle.is_finished());
    cancel.cancel();
    let site = handle.await.unwrap();
    assert_eq!(site.carousel().current_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn idle_page_waits_for_cancel() {
    let (_input_tx, input_rx) = mpsc::channel::<PageInput<ElementId>>(1);
    let (_preload_tx, preload_rx) = mpsc::channel::<PreloadEvent<ElementId>>(1);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runtime::run(
        site(0),
        Instant::now(),
        input_rx,
        preload_rx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(30)).await;
    cancel.cancel();
    let site = handle.await.unwrap();
    assert!(site.carousel().is_idle());
    assert_eq!(site.carousel().total(), 0);
}

#[tokio::test(start_paused = true)]
async fn page_clock_starts_at_mount() {
    let origin = Instant::now();
    let site = site(4);
    // Setup work between mount and the loop must not delay the first rotation.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let (_input_tx, input_rx) = mpsc::channel::<PageInput<ElementId>>(1);
    let (_preload_tx, preload_rx) = mpsc::channel::<PreloadEvent<ElementId>>(1);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runtime::run(
        site,
        origin,
        input_rx,
        preload_rx,
        cancel.clone(),
    ));

    tokio::time::sleep_until(origin + Duration::from_millis(7500)).await;
    cancel.cancel();
    let site = handle.await.unwrap();
    assert_eq!(site.carousel().current_index(), 1);
    assert_eq!(counter(&site), "02");
}
