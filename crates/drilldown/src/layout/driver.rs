//! Recomputation triggers for the displayed layout.
//!
//! A [`LayoutDriver`] owns a background task that recomputes the layout of
//! the current diagram
//!
//! - once when it is spawned (first mount),
//! - immediately whenever the navigation state changes, using the last
//!   debounced container width,
//! - after a burst of resize notifications has been quiet for the debounce
//!   window, using only the last width of the burst.
//!
//! Every computation gets a generation number. Computations are never
//! cancelled, but a result is only published when it belongs to the latest
//! generation issued; older results are dropped on arrival. The published
//! [`LayoutView`] is therefore always the answer to the most recent request.

use std::{sync::Arc, time::Duration};

use log::{debug, error, info, trace};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{JoinError, JoinHandle, JoinSet},
    time::{Instant, sleep_until},
};

use super::orchestrator::{LayoutOrchestrator, PositionedGraph};
use crate::{error::DrilldownError, navigation::NavigationState};

/// Snapshot of what the rendering surface should show.
#[derive(Debug, Clone, Default)]
pub struct LayoutView {
    generation: u64,
    requested_id: String,
    width: Option<f32>,
    loading: bool,
    has_layouted: bool,
    graph: Arc<PositionedGraph>,
}

impl LayoutView {
    /// Generation of the computation that produced [`graph`](Self::graph).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Diagram id that was requested for the displayed graph.
    ///
    /// Differs from the graph's own id when the request fell back to the
    /// root diagram.
    pub fn requested_id(&self) -> &str {
        &self.requested_id
    }

    /// Container width the displayed graph was computed for.
    pub fn width(&self) -> Option<f32> {
        self.width
    }

    /// Whether the latest requested computation is still running.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether any layout result has been published yet.
    pub fn has_layouted(&self) -> bool {
        self.has_layouted
    }

    pub fn graph(&self) -> &Arc<PositionedGraph> {
        &self.graph
    }
}

/// Handle to the background layout task.
///
/// Dropping the handle stops the task just like [`shutdown`](Self::shutdown),
/// without waiting for it.
#[derive(Debug)]
pub struct LayoutDriver {
    resize_tx: mpsc::UnboundedSender<f32>,
    view_rx: watch::Receiver<LayoutView>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LayoutDriver {
    /// Spawns the layout task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn spawn(
        orchestrator: Arc<LayoutOrchestrator>,
        navigation: &NavigationState,
        initial_width: Option<f32>,
        debounce: Duration,
    ) -> Self {
        let (resize_tx, resize_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(LayoutView::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = DriverTask {
            orchestrator,
            navigation_rx: navigation.subscribe(),
            resize_rx,
            view_tx,
            debounce,
            width: initial_width,
            pending_width: None,
            deadline: None,
            latest_generation: 0,
            in_flight: JoinSet::new(),
        };
        let handle = tokio::spawn(task.run(shutdown_rx));

        Self {
            resize_tx,
            view_rx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Reports a new container width.
    pub fn notify_resize(&self, width: f32) {
        if self.resize_tx.send(width).is_err() {
            debug!(width; "Layout task stopped, ignoring resize");
        }
    }

    /// Returns the current view.
    pub fn view(&self) -> LayoutView {
        self.view_rx.borrow().clone()
    }

    /// Returns a receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<LayoutView> {
        self.view_rx.clone()
    }

    /// Waits until a finished layout requested for `diagram_id` is shown.
    ///
    /// # Errors
    ///
    /// Returns [`DrilldownError::Runtime`] if the layout task stops first.
    pub async fn settled(&self, diagram_id: &str) -> Result<LayoutView, DrilldownError> {
        let mut view_rx = self.view_rx.clone();
        let view = view_rx
            .wait_for(|view| view.has_layouted && !view.loading && view.requested_id == diagram_id)
            .await
            .map_err(|_| DrilldownError::Runtime("layout task stopped".to_string()))?;
        Ok(view.clone())
    }

    /// Stops the layout task and waits for it to exit.
    ///
    /// Computations still running are left to finish on their own; their
    /// results are discarded.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!(err:%; "Layout task ended abnormally");
            }
        }
    }
}

/// A computation that has come back.
struct Completed {
    generation: u64,
    diagram_id: String,
    width: Option<f32>,
    result: Result<PositionedGraph, JoinError>,
}

struct DriverTask {
    orchestrator: Arc<LayoutOrchestrator>,
    navigation_rx: watch::Receiver<String>,
    resize_rx: mpsc::UnboundedReceiver<f32>,
    view_tx: watch::Sender<LayoutView>,
    debounce: Duration,
    /// Width used for new computations.
    width: Option<f32>,
    /// Last width of a resize burst that is still settling.
    pending_width: Option<f32>,
    deadline: Option<Instant>,
    latest_generation: u64,
    in_flight: JoinSet<Completed>,
}

impl DriverTask {
    async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) {
        debug!(width:? = self.width; "Layout task started");
        self.start_layout();
        let mut navigation_open = true;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                changed = self.navigation_rx.changed(), if navigation_open => {
                    match changed {
                        Ok(()) => self.start_layout(),
                        Err(_) => {
                            debug!("Navigation state dropped, no more navigation triggers");
                            navigation_open = false;
                        }
                    }
                }
                Some(width) = self.resize_rx.recv() => {
                    trace!(width; "Resize notified");
                    self.pending_width = Some(width);
                    self.deadline = Some(Instant::now() + self.debounce);
                }
                _ = sleep_until(self.deadline.unwrap_or_else(Instant::now)), if self.deadline.is_some() => {
                    self.deadline = None;
                    self.width = self.pending_width.take();
                    self.start_layout();
                }
                Some(joined) = self.in_flight.join_next() => match joined {
                    Ok(completed) => self.finish(completed),
                    Err(err) => error!(err:%; "Layout computation task failed"),
                },
            }
        }

        // In-flight computations finish on their own; results are dropped.
        self.in_flight.detach_all();
        debug!("Layout task stopped");
    }

    fn start_layout(&mut self) {
        self.latest_generation += 1;
        let generation = self.latest_generation;
        let diagram_id = self.navigation_rx.borrow_and_update().clone();
        let width = self.width;

        debug!(generation, diagram_id = diagram_id.as_str(), width:?; "Starting layout");
        self.view_tx.send_modify(|view| view.loading = true);

        let orchestrator = Arc::clone(&self.orchestrator);
        self.in_flight.spawn(async move {
            let requested = diagram_id.clone();
            // Engine panics arrive here as a JoinError.
            let result = tokio::spawn(async move { orchestrator.compute(&requested, width).await }).await;
            Completed {
                generation,
                diagram_id,
                width,
                result,
            }
        });
    }

    fn finish(&mut self, completed: Completed) {
        let Completed {
            generation,
            diagram_id,
            width,
            result,
        } = completed;

        if generation < self.latest_generation {
            debug!(
                generation,
                latest = self.latest_generation,
                diagram_id = diagram_id.as_str();
                "Discarding stale layout"
            );
            return;
        }

        let graph = match result {
            Ok(graph) => graph,
            Err(err) => {
                error!(diagram_id = diagram_id.as_str(), err:%; "Layout computation panicked");
                self.orchestrator.degraded(&diagram_id)
            }
        };

        info!(
            generation,
            diagram_id = diagram_id.as_str(),
            outcome:? = graph.outcome();
            "Publishing layout"
        );
        self.view_tx.send_replace(LayoutView {
            generation,
            requested_id: diagram_id,
            width,
            loading: false,
            has_layouted: true,
            graph: Arc::new(graph),
        });
    }
}
