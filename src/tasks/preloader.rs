use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use image::GenericImageView;
use page_model::Surface;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::task::{Id as TaskId, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::PreloadConfig;
use crate::error::PreloadError;
use crate::events::{LoadedImage, PreloadEvent};

/// Fetches image resources by URL.
pub trait ImageSource: Send + Sync + 'static {
    fn load(&self, url: &str) -> impl Future<Output = Result<LoadedImage, PreloadError>> + Send;
}

/// Resolves site-relative URLs under a root directory and fully decodes the
/// image on the blocking pool.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a URL such as `/img/hero-1.jpg?v=2` to a path under the root.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, PreloadError> {
        let unsupported = || PreloadError::Unsupported {
            url: url.to_string(),
        };
        let trimmed = url.trim();
        if trimmed.is_empty()
            || trimmed.contains("://")
            || trimmed.starts_with("//")
            || trimmed.starts_with("data:")
        {
            return Err(unsupported());
        }
        let path_part = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');
        let relative = Path::new(path_part);
        if path_part.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(unsupported());
        }
        Ok(self.root.join(relative))
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, url: &str) -> impl Future<Output = Result<LoadedImage, PreloadError>> + Send {
        let resolved = self.resolve(url);
        let url = url.to_string();
        async move {
            let path = resolved?;
            let task_url = url.clone();
            tokio::task::spawn_blocking(move || decode_dimensions(&path, task_url))
                .await
                .map_err(|_| PreloadError::Aborted { url })?
        }
    }
}

fn decode_dimensions(path: &Path, url: String) -> Result<LoadedImage, PreloadError> {
    let reader = image::ImageReader::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => PreloadError::NotFound { url: url.clone() },
        _ => PreloadError::Io {
            url: url.clone(),
            reason: err.to_string(),
        },
    })?;
    let reader = reader.with_guessed_format().map_err(|err| PreloadError::Io {
        url: url.clone(),
        reason: err.to_string(),
    })?;
    let img = reader.decode().map_err(|err| PreloadError::Decode {
        url: url.clone(),
        reason: err.to_string(),
    })?;
    let (width, height) = img.dimensions();
    Ok(LoadedImage { url, width, height })
}

/// One declared background: the element to paint and the image it wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadTask<E> {
    pub element: E,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadFailure<E> {
    pub task: PreloadTask<E>,
    pub error: PreloadError,
}

/// Outcome of every task once the whole batch has settled.
#[derive(Debug, Clone)]
pub struct PreloadReport<E> {
    pub loaded: Vec<PreloadTask<E>>,
    pub failed: Vec<PreloadFailure<E>>,
}

impl<E> Default for PreloadReport<E> {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<E> PreloadReport<E> {
    /// Aggregate success: every declared image loaded.
    pub fn all_loaded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Aggregate failure: every task that did not load, with its reason.
    pub fn failures(&self) -> &[PreloadFailure<E>] {
        &self.failed
    }

    pub fn settled(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }
}

#[derive(Debug)]
pub struct ImagePreloader<E> {
    tasks: Vec<PreloadTask<E>>,
    max_in_flight: usize,
}

impl<E> ImagePreloader<E>
where
    E: Clone + Send + 'static,
{
    /// Collects every element declaring a background image URL.
    pub fn discover<S>(surface: &S, cfg: &PreloadConfig) -> Self
    where
        S: Surface<Element = E>,
    {
        let tasks = surface
            .query_all(None, &cfg.selector)
            .into_iter()
            .filter_map(|element| {
                let url = surface.attribute(&element, &cfg.attribute)?;
                let url = url.trim();
                if url.is_empty() {
                    debug!(attribute = %cfg.attribute, "empty image url; skipping element");
                    return None;
                }
                Some(PreloadTask {
                    element,
                    url: url.to_string(),
                })
            })
            .collect();
        Self::from_tasks(tasks, cfg.max_concurrent_loads)
    }

    pub fn from_tasks(tasks: Vec<PreloadTask<E>>, max_in_flight: usize) -> Self {
        Self {
            tasks,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn tasks(&self) -> &[PreloadTask<E>] {
        &self.tasks
    }

    /// Loads every task, at most `max_in_flight` at a time.
    ///
    /// Each task settles independently and is reported on `events` as soon
    /// as it does; a final [`PreloadEvent::Settled`] carries the report.
    /// Nothing is retried. Cancellation aborts whatever is still pending and
    /// records those tasks as [`PreloadError::Aborted`].
    pub async fn run<I>(
        self,
        source: Arc<I>,
        events: Sender<PreloadEvent<E>>,
        cancel: CancellationToken,
    ) -> PreloadReport<E>
    where
        I: ImageSource,
    {
        let total = self.tasks.len();
        let mut pending: VecDeque<PreloadTask<E>> = self.tasks.into();
        let mut in_flight: JoinSet<Result<LoadedImage, PreloadError>> = JoinSet::new();
        let mut owners: HashMap<TaskId, PreloadTask<E>> = HashMap::new();
        let mut report = PreloadReport::default();

        info!(total, max_in_flight = self.max_in_flight, "preloading slide images");

        loop {
            while in_flight.len() < self.max_in_flight {
                let Some(task) = pending.pop_front() else {
                    break;
                };
                let source = Arc::clone(&source);
                let url = task.url.clone();
                let handle = in_flight.spawn(async move { source.load(&url).await });
                owners.insert(handle.id(), task);
            }
            if in_flight.is_empty() {
                break;
            }

            select! {
                _ = cancel.cancelled() => {
                    in_flight.abort_all();
                    while let Some(joined) = in_flight.join_next_with_id().await {
                        settle(joined, &mut owners, &mut report, &events).await;
                    }
                    for task in pending.drain(..) {
                        let error = PreloadError::Aborted { url: task.url.clone() };
                        record_failure(task, error, &mut report, &events).await;
                    }
                    warn!(settled = report.settled(), total, "preload cancelled");
                    break;
                }
                Some(joined) = in_flight.join_next_with_id() => {
                    settle(joined, &mut owners, &mut report, &events).await;
                }
            }
        }

        if report.all_loaded() {
            info!(count = report.loaded.len(), "all slideshow images loaded");
        } else {
            error!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "some slideshow images failed to load"
            );
        }
        let _ = events.send(PreloadEvent::Settled(report.clone())).await;
        report
    }
}

async fn settle<E: Clone>(
    joined: Result<(TaskId, Result<LoadedImage, PreloadError>), tokio::task::JoinError>,
    owners: &mut HashMap<TaskId, PreloadTask<E>>,
    report: &mut PreloadReport<E>,
    events: &Sender<PreloadEvent<E>>,
) {
    let (id, outcome) = match joined {
        Ok((id, outcome)) => (id, outcome),
        Err(join_err) => {
            let id = join_err.id();
            let Some(task) = owners.remove(&id) else {
                return;
            };
            if join_err.is_panic() {
                error!(url = %task.url, "image load task panicked");
            }
            let error = PreloadError::Aborted {
                url: task.url.clone(),
            };
            record_failure(task, error, report, events).await;
            return;
        }
    };
    let Some(task) = owners.remove(&id) else {
        return;
    };
    match outcome {
        Ok(image) => {
            debug!(url = %image.url, width = image.width, height = image.height, "image preloaded");
            report.loaded.push(task.clone());
            let _ = events
                .send(PreloadEvent::Loaded {
                    element: task.element,
                    image,
                })
                .await;
        }
        Err(error) => record_failure(task, error, report, events).await,
    }
}

async fn record_failure<E: Clone>(
    task: PreloadTask<E>,
    error: PreloadError,
    report: &mut PreloadReport<E>,
    events: &Sender<PreloadEvent<E>>,
) {
    error!(url = %task.url, %error, "error loading slideshow image");
    report.failed.push(PreloadFailure {
        task: task.clone(),
        error: error.clone(),
    });
    let _ = events
        .send(PreloadEvent::Failed {
            element: task.element,
            error,
        })
        .await;
}
