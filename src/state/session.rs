/// Session coordinator
///
/// Owns the navigation ring, the validation gateway and the crop store, and
/// keeps a single "current entry" cursor. The UI layer calls one method per
/// user intent:
/// - navigation (`next`, `previous`) walks the ring, validating lazily
/// - selection edits go through the constraint engine in `selection`
/// - `commit_crop` / `undo_last_crop` hand off to the crop store and never
///   touch ring or geometry state
use log::{debug, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};

use super::data::{EntryId, ImageEntry};
use super::ring::{NavDirection, Ring};
use crate::color::OutlineColor;
use crate::error::{CollaboratorError, Result, SessionError};
use crate::geometry::{Dimensions, Rect};
use crate::io::export::{save_async, CropRequest, CropStore};
use crate::selection::{self, MoveDirection, ResizeDirection, Steps};
use crate::validation::{Gateway, MetadataDecoder, Renderer};

/// Settings fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Target width / height ratio
    pub aspect: f64,
    pub steps: Steps,
    /// Log old and new selection on every edit
    pub debug: bool,
}

impl SessionConfig {
    pub fn new(aspect: f64, steps: Steps) -> Self {
        Self {
            aspect,
            steps,
            debug: false,
        }
    }
}

/// Outcome of a background save, see `Session::commit_async`
#[derive(Debug, Clone)]
pub struct Commit {
    pub filename: String,
    pub result: std::result::Result<PathBuf, String>,
}

/// Returned by `quit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Files the session started with
    pub files: usize,
    /// Entries still in the ring
    pub remaining: usize,
    /// Crops saved (minus undone ones)
    pub saved: usize,
}

pub struct Session<D, R, S>
where
    R: Renderer,
{
    ring: Ring,
    current: EntryId,
    gateway: Gateway<D, R>,
    store: S,
    handle: Option<R::Handle>,
    config: SessionConfig,
    files: usize,
    saved: usize,
    last_saved: Option<String>,
}

impl<D, R, S> Session<D, R, S>
where
    D: MetadataDecoder,
    R: Renderer,
    S: CropStore,
{
    /// Build the ring from `paths` and move to the first valid entry
    ///
    /// Fails with `NoFiles` for an empty list and `NothingValid` when every
    /// file fails validation.
    pub fn new(
        paths: Vec<PathBuf>,
        config: SessionConfig,
        decoder: D,
        renderer: R,
        store: S,
    ) -> Result<Self> {
        let files = paths.len();
        let ring = Ring::from_paths(paths, config.aspect).ok_or(SessionError::NoFiles)?;

        // Start one before the first entry so the first step lands on it
        let first = ring.first();
        let before_first = ring
            .neighbor(first, NavDirection::Previous)
            .ok_or(SessionError::UnknownEntry(first.0))?;

        let mut session = Self {
            ring,
            current: before_first,
            gateway: Gateway::new(decoder, renderer),
            store,
            handle: None,
            config,
            files,
            saved: 0,
            last_saved: None,
        };

        match session.navigate(NavDirection::Next) {
            Ok(_) => {}
            Err(SessionError::Exhausted) => return Err(SessionError::NothingValid),
            Err(e) => return Err(e),
        }

        info!(
            "✅ Session ready: {} files, starting at {}",
            files,
            session.entry().filename
        );
        Ok(session)
    }

    /// Move to the next navigable entry
    pub fn next(&mut self) -> Result<&ImageEntry> {
        self.navigate(NavDirection::Next)
    }

    /// Move to the previous navigable entry
    pub fn previous(&mut self) -> Result<&ImageEntry> {
        self.navigate(NavDirection::Previous)
    }

    pub fn grow_selection(&mut self) -> &ImageEntry {
        self.resize(ResizeDirection::Grow)
    }

    pub fn shrink_selection(&mut self) -> &ImageEntry {
        self.resize(ResizeDirection::Shrink)
    }

    pub fn move_selection(&mut self, direction: MoveDirection) -> &ImageEntry {
        let steps = self.config.steps;
        let before = self.entry().selection;
        selection::move_selection(self.entry_mut(), direction, &steps);
        self.trace("move", before);
        self.entry()
    }

    pub fn reset_selection(&mut self) -> &ImageEntry {
        let before = self.entry().selection;
        let entry = self.entry_mut();
        entry.selection = selection::reset(entry);
        self.trace("reset", before);
        self.entry()
    }

    pub fn toggle_outline_color(&mut self) -> &ImageEntry {
        selection::toggle_outline_color(self.entry_mut());
        self.entry()
    }

    /// Save the current selection through the crop store
    pub fn commit_crop(&mut self) -> std::result::Result<PathBuf, CollaboratorError> {
        let request = self.crop_request();
        let result = self.store.crop_and_save(&request);
        self.settle_commit(request.filename, result)
    }

    /// Save the current selection on a blocking worker thread
    ///
    /// The returned future owns everything it needs. Hand its output to
    /// `finish_commit` once it resolves.
    pub fn commit_async(&self) -> impl Future<Output = Commit> + Send + 'static
    where
        S: Clone + Send + 'static,
    {
        save_commit(self.store.clone(), self.crop_request())
    }

    /// Record the outcome of `commit_async`
    pub fn finish_commit(&mut self, commit: Commit) -> std::result::Result<PathBuf, String> {
        self.settle_commit(commit.filename, commit.result)
    }

    /// Delete the last saved crop, or the current file's crop if none was saved
    pub fn undo_last_crop(&mut self) -> std::result::Result<PathBuf, CollaboratorError> {
        let filename = self.undo_target().to_string();
        match self.store.delete_saved(&filename) {
            Ok(deleted) => {
                if self.last_saved.as_deref() == Some(filename.as_str()) {
                    self.last_saved = None;
                    self.saved = self.saved.saturating_sub(1);
                }
                Ok(deleted)
            }
            Err(e) => {
                warn!("⚠️  Undo failed for {}: {}", filename, e);
                Err(e)
            }
        }
    }

    /// End the session
    pub fn quit(&self) -> Summary {
        let summary = Summary {
            files: self.files,
            remaining: self.ring.len(),
            saved: self.saved,
        };
        info!(
            "👋 Done: {} saved, {} of {} files skipped",
            summary.saved,
            summary.files - summary.remaining,
            summary.files
        );
        summary
    }

    /// Crop request for the current entry and selection
    pub fn crop_request(&self) -> CropRequest {
        let entry = self.entry();
        CropRequest {
            source: entry.path.clone(),
            filename: entry.filename.clone(),
            selection: entry.selection,
        }
    }

    /// Filename `undo_last_crop` would delete
    pub fn undo_target(&self) -> &str {
        self.last_saved
            .as_deref()
            .unwrap_or(self.entry().filename.as_str())
    }

    pub fn current_id(&self) -> EntryId {
        self.current
    }

    pub fn current(&self) -> &ImageEntry {
        self.entry()
    }

    pub fn path(&self) -> &Path {
        self.entry().path()
    }

    pub fn filename(&self) -> &str {
        &self.entry().filename
    }

    pub fn dimensions(&self) -> Dimensions {
        self.entry().dimensions
    }

    pub fn selection(&self) -> Rect {
        self.entry().selection
    }

    pub fn outline(&self) -> OutlineColor {
        self.entry().outline
    }

    /// Display handle for the current entry
    pub fn handle(&self) -> Option<&R::Handle> {
        self.handle.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Step the ring and prepare a display handle for the entry reached
    ///
    /// An entry whose handle cannot be prepared is evicted and the walk
    /// continues in the same direction.
    fn navigate(&mut self, direction: NavDirection) -> Result<&ImageEntry> {
        let mut from = self.current;

        for _ in 0..=self.ring.len() {
            let step = self
                .ring
                .step_and_validate(from, direction, &mut self.gateway)?;

            if step.id == self.current && step.handle.is_none() && self.handle.is_some() {
                return Ok(self.entry());
            }

            let prepared = match step.handle {
                Some(handle) => Ok(handle),
                None => {
                    let path = self
                        .ring
                        .get(step.id)
                        .map(|entry| entry.path.clone())
                        .ok_or(SessionError::UnknownEntry(step.id.0))?;
                    self.gateway.prepare(&path)
                }
            };

            match prepared {
                Ok(handle) => {
                    self.current = step.id;
                    self.handle = Some(handle);
                    debug!("Now showing {}", self.entry().path.display());
                    return Ok(self.entry());
                }
                Err(e) => {
                    warn!("⚠️  Cannot display entry {}: {}", step.id, e);
                    from = self
                        .ring
                        .neighbor(step.id, direction.reversed())
                        .ok_or(SessionError::UnknownEntry(step.id.0))?;
                    self.ring.remove(step.id)?;
                    if step.id == self.current {
                        self.handle = None;
                    }
                }
            }
        }

        Err(SessionError::Exhausted)
    }

    fn settle_commit<E: std::fmt::Display>(
        &mut self,
        filename: String,
        result: std::result::Result<PathBuf, E>,
    ) -> std::result::Result<PathBuf, E> {
        match &result {
            Ok(_) => {
                self.saved += 1;
                self.last_saved = Some(filename);
            }
            Err(e) => warn!("⚠️  Save failed for {}: {}", filename, e),
        }
        result
    }

    fn resize(&mut self, direction: ResizeDirection) -> &ImageEntry {
        let steps = self.config.steps;
        let before = self.entry().selection;
        selection::resize(self.entry_mut(), direction, &steps);
        self.trace("resize", before);
        self.entry()
    }

    fn trace(&self, action: &str, before: Rect) {
        if !self.config.debug {
            return;
        }
        let entry = self.entry();
        let after = entry.selection;
        debug!(
            "{} on {} ({}x{})",
            action, entry.filename, entry.dimensions.width, entry.dimensions.height
        );
        debug!(
            "   Old selection: x={} y={} w={} h={}",
            before.x, before.y, before.width, before.height
        );
        debug!(
            "   New selection: x={} y={} w={} h={}",
            after.x, after.y, after.width, after.height
        );
    }

    fn entry(&self) -> &ImageEntry {
        self.ring
            .get(self.current)
            .expect("current entry is always in the ring")
    }

    fn entry_mut(&mut self) -> &mut ImageEntry {
        self.ring
            .get_mut(self.current)
            .expect("current entry is always in the ring")
    }
}

async fn save_commit<S>(store: S, request: CropRequest) -> Commit
where
    S: CropStore + Send + 'static,
{
    let filename = request.filename.clone();
    let result = save_async(store, request).await;
    Commit { filename, result }
}

impl<D, R, S> std::fmt::Debug for Session<D, R, S>
where
    R: Renderer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.current)
            .field("remaining", &self.ring.len())
            .field("config", &self.config)
            .field("last_saved", &self.last_saved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::testing::{ScriptedDecoder, ScriptedRenderer};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Crop store that records requests instead of touching the disk
    #[derive(Debug, Default, Clone)]
    struct RecordingStore {
        saved: Arc<Mutex<Vec<CropRequest>>>,
        deleted: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl CropStore for RecordingStore {
        fn crop_and_save(&self, request: &CropRequest) -> std::result::Result<PathBuf, CollaboratorError> {
            if self.fail {
                return Err(CollaboratorError::NotFound(request.source.clone()));
            }
            self.saved.lock().unwrap().push(request.clone());
            Ok(PathBuf::from("/out").join(&request.filename))
        }

        fn delete_saved(&self, filename: &str) -> std::result::Result<PathBuf, CollaboratorError> {
            if self.fail {
                return Err(CollaboratorError::NotFound(PathBuf::from(filename)));
            }
            self.deleted.lock().unwrap().push(filename.to_string());
            Ok(PathBuf::from("/out").join(filename))
        }
    }

    /// Renderer that stops working for a path after a number of successes
    #[derive(Debug, Default)]
    struct FlakyRenderer {
        budget: HashMap<PathBuf, usize>,
    }

    impl Renderer for FlakyRenderer {
        type Handle = PathBuf;

        fn render_prepare(&mut self, path: &Path) -> std::result::Result<PathBuf, CollaboratorError> {
            if let Some(left) = self.budget.get_mut(path) {
                if *left == 0 {
                    return Err(CollaboratorError::NotFound(path.to_path_buf()));
                }
                *left -= 1;
            }
            Ok(path.to_path_buf())
        }
    }

    type TestSession = Session<ScriptedDecoder, ScriptedRenderer, RecordingStore>;

    fn paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("/photos/img_{:02}.jpg", i)))
            .collect()
    }

    fn config() -> SessionConfig {
        SessionConfig::new(1.6, Steps::default())
    }

    fn session(count: usize, decoder: ScriptedDecoder) -> TestSession {
        Session::new(
            paths(count),
            config(),
            decoder,
            ScriptedRenderer::default(),
            RecordingStore::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_starts_at_first_valid_entry() {
        let s = session(3, ScriptedDecoder::default());
        assert_eq!(s.current_id(), EntryId(0));
        assert_eq!(s.selection(), Rect::new(0, 250, 4000, 2500));
        assert_eq!(s.handle(), Some(&paths(3)[0]));
        assert_eq!(s.filename(), "img_00.jpg");
    }

    #[test]
    fn test_startup_skips_invalid_files() {
        let all = paths(4);
        let s = session(4, ScriptedDecoder::failing(&all[..2]));
        assert_eq!(s.current_id(), EntryId(2));
        assert_eq!(s.ring().len(), 2);
    }

    #[test]
    fn test_startup_failures() {
        let empty: std::result::Result<TestSession, _> = Session::new(
            Vec::new(),
            config(),
            ScriptedDecoder::default(),
            ScriptedRenderer::default(),
            RecordingStore::default(),
        );
        assert!(matches!(empty, Err(SessionError::NoFiles)));

        let all = paths(3);
        let none_valid: std::result::Result<TestSession, _> = Session::new(
            all.clone(),
            config(),
            ScriptedDecoder::failing(&all),
            ScriptedRenderer::default(),
            RecordingStore::default(),
        );
        assert!(matches!(none_valid, Err(SessionError::NothingValid)));
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut s = session(3, ScriptedDecoder::default());
        assert_eq!(s.previous().unwrap().id, EntryId(2));
        assert_eq!(s.next().unwrap().id, EntryId(0));
        assert_eq!(s.next().unwrap().id, EntryId(1));
        assert_eq!(s.path(), Path::new("/photos/img_01.jpg"));
    }

    #[test]
    fn test_traversal_evicts_failures() {
        let all = paths(7);
        let failing = [&all[1], &all[3], &all[4], &all[6]];
        let mut s = session(7, ScriptedDecoder::failing(&failing));

        for _ in 0..7 {
            s.next().unwrap();
        }

        assert_eq!(s.ring().len(), 3);
        s.ring().assert_linked();
        let start = s.ring().first();
        assert!(s.ring().iter_from(start).all(|entry| entry.is_navigable()));
        let ids: Vec<_> = s.ring().iter_from(start).map(|entry| entry.id).collect();
        assert_eq!(ids, vec![EntryId(0), EntryId(2), EntryId(5)]);
    }

    #[test]
    fn test_only_survivor_stays_current() {
        let all = paths(3);
        let mut s = session(3, ScriptedDecoder::failing(&all[1..]));
        assert_eq!(s.next().unwrap().id, EntryId(0));
        assert_eq!(s.previous().unwrap().id, EntryId(0));
        assert_eq!(s.ring().len(), 1);
    }

    #[test]
    fn test_display_failure_evicts_and_continues() {
        let all = paths(3);
        let mut renderer = FlakyRenderer::default();
        // Entry 0 renders once (validation), then never again
        renderer.budget.insert(all[0].clone(), 1);

        let mut s = Session::new(
            all.clone(),
            config(),
            ScriptedDecoder::default(),
            renderer,
            RecordingStore::default(),
        )
        .unwrap();
        assert_eq!(s.current_id(), EntryId(0));

        assert_eq!(s.next().unwrap().id, EntryId(1));
        // Back over 0: it cannot be displayed, so the walk carries on to 2
        assert_eq!(s.previous().unwrap().id, EntryId(2));
        assert_eq!(s.ring().len(), 2);
        assert!(!s.ring().contains(EntryId(0)));
        s.ring().assert_linked();
    }

    #[test]
    fn test_selection_edits_stick_to_entry() {
        let mut s = session(2, ScriptedDecoder::default());
        let shrunk = s.shrink_selection().selection;
        assert_eq!(shrunk.width, 3800);

        let moved = s.move_selection(MoveDirection::Up).selection;
        assert_eq!(moved.y, shrunk.y - 150);

        s.next().unwrap();
        assert_eq!(s.selection(), Rect::new(0, 250, 4000, 2500));
        s.previous().unwrap();
        assert_eq!(s.selection(), moved);

        assert_eq!(s.reset_selection().selection, Rect::new(0, 250, 4000, 2500));
    }

    #[test]
    fn test_toggle_outline() {
        let mut s = session(1, ScriptedDecoder::default());
        let before = s.selection();
        assert_eq!(s.toggle_outline_color().outline, OutlineColor::Dark);
        assert_eq!(s.outline(), OutlineColor::Dark);
        assert_eq!(s.selection(), before);
    }

    #[test]
    fn test_debug_traces_do_not_change_results() {
        let mut traced = Session::new(
            paths(1),
            SessionConfig {
                debug: true,
                ..config()
            },
            ScriptedDecoder::default(),
            ScriptedRenderer::default(),
            RecordingStore::default(),
        )
        .unwrap();
        let mut plain = session(1, ScriptedDecoder::default());

        assert_eq!(
            traced.shrink_selection().selection,
            plain.shrink_selection().selection
        );
    }

    #[test]
    fn test_commit_and_undo() {
        let mut s = session(2, ScriptedDecoder::default());
        s.shrink_selection();
        let selection = s.selection();

        let saved = s.commit_crop().unwrap();
        assert_eq!(saved, PathBuf::from("/out/img_00.jpg"));
        assert_eq!(s.selection(), selection);
        assert_eq!(s.store().saved.lock().unwrap()[0].selection, selection);

        // Undo targets the last save even after moving on
        s.next().unwrap();
        assert_eq!(s.undo_target(), "img_00.jpg");
        s.undo_last_crop().unwrap();
        assert_eq!(s.store().deleted.lock().unwrap().as_slice(), ["img_00.jpg".to_string()]);

        // With nothing saved, undo falls back to the current file
        assert_eq!(s.undo_target(), "img_01.jpg");
        assert_eq!(s.quit().saved, 0);
    }

    #[test]
    fn test_store_failure_leaves_state_alone() {
        let mut s = Session::new(
            paths(2),
            config(),
            ScriptedDecoder::default(),
            ScriptedRenderer::default(),
            RecordingStore {
                fail: true,
                ..RecordingStore::default()
            },
        )
        .unwrap();
        let selection = s.selection();

        assert!(s.commit_crop().is_err());
        assert!(s.undo_last_crop().is_err());
        assert_eq!(s.selection(), selection);
        assert_eq!(s.current_id(), EntryId(0));
        assert_eq!(s.ring().len(), 2);
    }

    #[test]
    fn test_quit_summary() {
        let all = paths(4);
        let mut s = session(4, ScriptedDecoder::failing(&[&all[3]]));
        s.previous().unwrap();
        s.commit_crop().unwrap();

        assert_eq!(
            s.quit(),
            Summary {
                files: 4,
                remaining: 3,
                saved: 1
            }
        );
    }

    #[test]
    fn test_undo_of_uncommitted_file_keeps_count() {
        let mut s = session(2, ScriptedDecoder::default());
        s.commit_crop().unwrap();
        s.next().unwrap();
        s.commit_crop().unwrap();

        s.undo_last_crop().unwrap();
        // Falls back to the current file, which is no longer a session save
        assert_eq!(s.undo_target(), "img_01.jpg");
        s.undo_last_crop().unwrap();

        assert_eq!(s.quit().saved, 1);
    }

    #[tokio::test]
    async fn test_commit_async_records_save() {
        let mut s = session(2, ScriptedDecoder::default());
        s.shrink_selection();
        let selection = s.selection();

        let commit = s.commit_async().await;
        assert_eq!(commit.filename, "img_00.jpg");
        assert_eq!(
            s.finish_commit(commit).unwrap(),
            PathBuf::from("/out/img_00.jpg")
        );
        assert_eq!(s.store().saved.lock().unwrap()[0].selection, selection);
        assert_eq!(s.undo_target(), "img_00.jpg");
        assert_eq!(s.quit().saved, 1);
    }

    #[tokio::test]
    async fn test_commit_async_failure_is_not_recorded() {
        let mut s = Session::new(
            paths(2),
            config(),
            ScriptedDecoder::default(),
            ScriptedRenderer::default(),
            RecordingStore {
                fail: true,
                ..RecordingStore::default()
            },
        )
        .unwrap();

        let commit = s.commit_async().await;
        assert!(s.finish_commit(commit).is_err());
        assert_eq!(s.undo_target(), "img_00.jpg");
        assert_eq!(s.quit().saved, 0);
    }

    fn failing_kind(all: &[PathBuf], kinds: &[u8], kind: u8) -> Vec<PathBuf> {
        all.iter()
            .zip(kinds)
            .filter(|(_, k)| **k == kind)
            .map(|(path, _)| path.clone())
            .collect()
    }

    proptest! {
        /// kinds: 0 = valid, 1 = decode fails, 2 = render fails
        #[test]
        fn traversal_keeps_exactly_the_valid_entries(
            kinds in proptest::collection::vec(0u8..3, 1..12),
            start in 0usize..12,
            forward in any::<bool>(),
        ) {
            let all = paths(kinds.len());
            let valid = kinds.iter().filter(|k| **k == 0).count();

            let built = Session::new(
                all.clone(),
                config(),
                ScriptedDecoder::failing(&failing_kind(&all, &kinds, 1)),
                ScriptedRenderer::failing(&failing_kind(&all, &kinds, 2)),
                RecordingStore::default(),
            );
            if valid == 0 {
                prop_assert!(matches!(built, Err(SessionError::NothingValid)));
                return Ok(());
            }
            let mut s = built.unwrap();

            for _ in 0..start % kinds.len() {
                s.next().unwrap();
            }
            for _ in 0..=kinds.len() {
                let stepped = if forward { s.next() } else { s.previous() };
                stepped.unwrap();
            }

            prop_assert_eq!(s.ring().len(), valid);
            s.ring().assert_linked();
            let first = s.ring().first();
            prop_assert!(s.ring().iter_from(first).all(|entry| entry.is_navigable()));
            prop_assert!(s.current().is_navigable());
            prop_assert_eq!(kinds[s.current_id().0], 0);
        }
    }
}
