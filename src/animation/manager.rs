//! Tracks every running animation and drives their lifecycles.
//!
//! Each started animation gets its own thread. The manager only ever holds
//! its registry lock long enough to insert, look up, or sweep entries, so a
//! slow animation can never stall another caller. Tasks deregister
//! themselves with `try_lock`; if the map is busy at that moment the entry
//! stays behind with its finished flag set and the next sweep collects it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use rand::Rng;

use crate::animation::library::BUILTIN_ANIMATIONS;
use crate::animation::params::{
    AnimationToRunParams, GroupState, RunCount, RunningAnimationParams,
};
use crate::animation::{AnimationBody, AnimationDefinition, AnimationKind, GroupSpec};
use crate::error::{Error, Result};
use crate::section::Section;
use crate::strip::ObserverSlot;
use crate::sync::{CancelToken, Latch};

/// How often a waiting group rechecks its own token while a member runs.
const MEMBER_POLL: Duration = Duration::from_millis(25);
/// Grace period for an ended member to notice its token and wind down.
const MEMBER_END_GRACE: Duration = Duration::from_secs(1);

/// Cancellation and completion plumbing shared between the manager's
/// registry entry and the task thread itself.
#[derive(Clone)]
struct TaskSignals {
    token: CancelToken,
    done: Latch,
    finished: Arc<AtomicBool>,
}

impl TaskSignals {
    fn new() -> TaskSignals {
        TaskSignals {
            token: CancelToken::new(),
            done: Latch::new(),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

struct RunningHandle {
    params: Arc<RunningAnimationParams>,
    signals: TaskSignals,
}

/// The animation registry and scheduler for one strip.
pub struct AnimationManager {
    definitions: Mutex<HashMap<String, AnimationDefinition>>,
    running: Mutex<HashMap<String, RunningHandle>>,
    observers: Arc<ObserverSlot>,
    next_id: AtomicU64,
    // Handed to tasks so group schedulers can start members without keeping
    // the manager alive past its strip.
    self_weak: Weak<AnimationManager>,
}

impl AnimationManager {
    pub(crate) fn new(observers: Arc<ObserverSlot>) -> Arc<AnimationManager> {
        let definitions = BUILTIN_ANIMATIONS
            .iter()
            .map(|def| (def.name().to_string(), def.clone()))
            .collect();
        Arc::new_cyclic(|self_weak| AnimationManager {
            definitions: Mutex::new(definitions),
            running: Mutex::new(HashMap::new()),
            observers,
            next_id: AtomicU64::new(0),
            self_weak: self_weak.clone(),
        })
    }

    /// Adds a definition, replacing any previous one with the same name.
    /// Animations already running under the old definition keep going.
    pub fn register(&self, definition: AnimationDefinition) {
        let name = definition.name().to_string();
        let replaced = self
            .definitions
            .lock()
            .unwrap()
            .insert(name.clone(), definition);
        if replaced.is_some() {
            info!("[ANIM] Replaced definition '{}'", name);
        } else {
            debug!("[ANIM] Registered definition '{}'", name);
        }
    }

    /// All registered animation names, sorted.
    pub fn animation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.lock().unwrap().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Resolves `request` against `section` and spawns the animation on its
    /// own thread. Returns the running id, which was either requested or
    /// generated as `name-counter`.
    pub fn start_animation(
        &self,
        request: AnimationToRunParams,
        section: &Arc<Section>,
    ) -> Result<String> {
        let definition = self
            .definitions
            .lock()
            .unwrap()
            .get(&request.animation)
            .cloned()
            .ok_or_else(|| Error::UnknownAnimation(request.animation.clone()))?;

        let mut params = definition.resolve(&request, section)?;
        if params.id.is_empty() {
            params.id = format!(
                "{}-{}",
                params.animation,
                self.next_id.fetch_add(1, Ordering::Relaxed)
            );
        }
        let id = params.id.clone();
        let signals = TaskSignals::new();

        {
            let mut running = self.running.lock().unwrap();
            running.retain(|_, handle| !handle.signals.is_finished());
            if running.contains_key(&id) {
                return Err(Error::DuplicateAnimationId(id));
            }
            running.insert(
                id.clone(),
                RunningHandle {
                    params: Arc::new(params.clone()),
                    signals: signals.clone(),
                },
            );
        }

        info!(
            "[ANIM] Starting '{}' ({}) on '{}'",
            id, params.animation, params.section
        );

        let manager = self.self_weak.clone();
        let observers = Arc::clone(&self.observers);
        let section = Arc::clone(section);
        let kind = definition.kind().clone();
        thread::spawn(move || {
            Self::run_task(manager, observers, section, kind, params, signals)
        });

        Ok(id)
    }

    /// Requests cancellation of one animation. Unknown or already finished
    /// ids are a quiet no-op.
    pub fn end_animation(&self, id: &str) {
        let token = {
            let running = self.running.lock().unwrap();
            running.get(id).map(|handle| handle.signals.token.clone())
        };
        match token {
            Some(token) => {
                debug!("[ANIM] Ending '{}'", id);
                token.cancel();
            }
            None => debug!("[ANIM] End requested for unknown id '{}'", id),
        }
    }

    /// Requests cancellation of everything currently running.
    pub fn end_all(&self) {
        let tokens: Vec<CancelToken> = {
            let running = self.running.lock().unwrap();
            running
                .values()
                .map(|handle| handle.signals.token.clone())
                .collect()
        };
        if !tokens.is_empty() {
            info!("[ANIM] Ending all {} running animations", tokens.len());
        }
        for token in tokens {
            token.cancel();
        }
    }

    /// Blocks until the animation finishes or `timeout` passes. Unknown ids
    /// count as already finished. Returns `true` if the animation is done.
    pub fn wait_for(&self, id: &str, timeout: Duration) -> bool {
        let done = {
            let running = self.running.lock().unwrap();
            running.get(id).map(|handle| handle.signals.done.clone())
        };
        match done {
            Some(done) => done.wait_timeout(timeout),
            None => true,
        }
    }

    pub fn is_running(&self, id: &str) -> bool {
        let running = self.running.lock().unwrap();
        running
            .get(id)
            .is_some_and(|handle| !handle.signals.is_finished())
    }

    pub fn running_ids(&self) -> Vec<String> {
        let running = self.running.lock().unwrap();
        running
            .iter()
            .filter(|(_, handle)| !handle.signals.is_finished())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The resolved parameter snapshot of a running animation.
    pub fn running_params(&self, id: &str) -> Option<Arc<RunningAnimationParams>> {
        let running = self.running.lock().unwrap();
        running
            .get(id)
            .filter(|handle| !handle.signals.is_finished())
            .map(|handle| Arc::clone(&handle.params))
    }

    /// Opportunistic sweep of finished entries. Does nothing if the registry
    /// is busy; the finished flags persist, so a later sweep collects them.
    pub fn prune_finished(&self) {
        if let Ok(mut running) = self.running.try_lock() {
            running.retain(|_, handle| !handle.signals.is_finished());
        }
    }

    fn run_task(
        manager: Weak<AnimationManager>,
        observers: Arc<ObserverSlot>,
        section: Arc<Section>,
        kind: AnimationKind,
        mut params: RunningAnimationParams,
        signals: TaskSignals,
    ) {
        observers.notify_animation_started(&params);

        let outcome = match kind {
            AnimationKind::Leaf(body) => {
                Self::run_leaf(&section, &params, body, &signals.token)
            }
            AnimationKind::Group(spec) => {
                Self::run_group(&manager, &section, &mut params, &spec, &signals.token)
            }
        };

        match outcome {
            Ok(()) if signals.token.is_cancelled() => {
                debug!("[ANIM] '{}' cancelled", params.id)
            }
            Ok(()) => debug!("[ANIM] '{}' finished", params.id),
            Err(err) => error!("[ANIM] '{}' stopped: {}", params.id, err),
        }

        observers.notify_animation_ended(&params);
        signals.finished.store(true, Ordering::Relaxed);
        signals.done.set();

        // Deregister, but only our own entry: once the finished flag is up a
        // new animation may legitimately reuse this id.
        if let Some(manager) = manager.upgrade() {
            if let Ok(mut running) = manager.running.try_lock() {
                let ours = running
                    .get(&params.id)
                    .is_some_and(|handle| Arc::ptr_eq(&handle.signals.finished, &signals.finished));
                if ours {
                    running.remove(&params.id);
                }
            }
        }
    }

    fn run_leaf(
        section: &Section,
        params: &RunningAnimationParams,
        body: AnimationBody,
        token: &CancelToken,
    ) -> Result<()> {
        if params.run_count == RunCount::Count(0) {
            return Ok(());
        }
        let mut completed = 0u32;
        while !token.is_cancelled() {
            body(section, params, token)?;
            if let RunCount::Count(limit) = params.run_count {
                completed += 1;
                if completed >= limit {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Runs a group: pick a member, schedule it as a real animation on the
    /// same section, wait it out, pause, repeat. One member execution counts
    /// as one iteration against the group's run count.
    fn run_group(
        manager: &Weak<AnimationManager>,
        section: &Arc<Section>,
        params: &mut RunningAnimationParams,
        spec: &GroupSpec,
        token: &CancelToken,
    ) -> Result<()> {
        if spec.members.is_empty() {
            warn!("[ANIM] Group '{}' has no members", params.id);
            return Ok(());
        }
        if params.run_count == RunCount::Count(0) {
            return Ok(());
        }

        let mut completed = 0u32;
        while !token.is_cancelled() {
            let index = match params.group_state {
                GroupState::Ordered { next } => {
                    let index = next % spec.members.len();
                    params.group_state = GroupState::Ordered { next: index + 1 };
                    index
                }
                _ => rand::thread_rng().gen_range(0..spec.members.len()),
            };

            let mut request = AnimationToRunParams::new(&spec.members[index]);
            request.colors = params.source_colors.clone();
            request.direction = Some(params.direction);

            let Some(mgr) = manager.upgrade() else {
                return Ok(());
            };
            let member_id = mgr.start_animation(request, section)?;
            drop(mgr);

            let deadline = spec
                .member_timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms));
            loop {
                if token.is_cancelled() {
                    Self::end_member(manager, &member_id);
                    return Ok(());
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    debug!("[ANIM] '{}' timing out member '{}'", params.id, member_id);
                    Self::end_member(manager, &member_id);
                    break;
                }
                let Some(mgr) = manager.upgrade() else {
                    return Ok(());
                };
                let member_done = mgr.wait_for(&member_id, MEMBER_POLL);
                drop(mgr);
                if member_done {
                    break;
                }
            }

            if spec.post_delay_ms > 0 && !token.sleep(Duration::from_millis(spec.post_delay_ms)) {
                return Ok(());
            }

            if let RunCount::Count(limit) = params.run_count {
                completed += 1;
                if completed >= limit {
                    break;
                }
            }
        }
        Ok(())
    }

    fn end_member(manager: &Weak<AnimationManager>, member_id: &str) {
        if let Some(mgr) = manager.upgrade() {
            mgr.end_animation(member_id);
            mgr.wait_for(member_id, MEMBER_END_GRACE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::params::Direction;
    use crate::color::{Color, ColorSequence};
    use crate::section::SectionRegistry;
    use crate::state::PixelBuffer;
    use crate::strip::StripObserver;

    fn test_setup(num_leds: usize) -> (Arc<AnimationManager>, Arc<Section>, Arc<ObserverSlot>) {
        let observers = Arc::new(ObserverSlot::new());
        let registry = SectionRegistry::new();
        let section = Section::root(
            "strip",
            Arc::new(PixelBuffer::new(num_leds)),
            &registry,
            Arc::clone(&observers),
        );
        (AnimationManager::new(Arc::clone(&observers)), section, observers)
    }

    fn solid_request(color: Color) -> AnimationToRunParams {
        AnimationToRunParams::new("solid")
            .with_color(ColorSequence::solid(color))
            .with_delay(1)
    }

    #[test]
    fn unknown_animation_is_rejected() {
        let (manager, section, _) = test_setup(8);
        let err = manager
            .start_animation(AnimationToRunParams::new("nope"), &section)
            .unwrap_err();
        assert_eq!(err, Error::UnknownAnimation("nope".to_string()));
        assert!(manager.running_ids().is_empty());
    }

    #[test]
    fn generated_ids_combine_name_and_counter() {
        let (manager, section, _) = test_setup(8);
        let first = manager
            .start_animation(solid_request(Color::RED), &section)
            .unwrap();
        let second = manager
            .start_animation(solid_request(Color::BLUE), &section)
            .unwrap();
        assert_eq!(first, "solid-0");
        assert_eq!(second, "solid-1");
        assert!(manager.wait_for(&first, Duration::from_secs(5)));
        assert!(manager.wait_for(&second, Duration::from_secs(5)));
    }

    #[test]
    fn finished_animation_applied_its_colors() {
        let (manager, section, _) = test_setup(8);
        let id = manager
            .start_animation(solid_request(Color::GREEN), &section)
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
        for i in 0..8 {
            assert_eq!(section.prolonged_color(i).unwrap(), Color::GREEN);
        }
    }

    #[test]
    fn duplicate_running_id_is_rejected() {
        let (manager, section, _) = test_setup(8);
        let request = AnimationToRunParams::new("sparkle")
            .with_id("fixed")
            .with_run_count(RunCount::Infinite)
            .with_delay(5);
        manager.start_animation(request.clone(), &section).unwrap();

        let err = manager.start_animation(request, &section).unwrap_err();
        assert_eq!(err, Error::DuplicateAnimationId("fixed".to_string()));

        manager.end_animation("fixed");
        assert!(manager.wait_for("fixed", Duration::from_secs(5)));
    }

    #[test]
    fn id_is_reusable_after_the_run_finishes() {
        let (manager, section, _) = test_setup(8);
        let request = solid_request(Color::RED).with_id("again");
        let id = manager.start_animation(request.clone(), &section).unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(5)));

        // Second start under the same id must succeed once the first is done.
        let id = manager.start_animation(request, &section).unwrap();
        assert_eq!(id, "again");
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
    }

    #[test]
    fn cancellation_stops_an_infinite_animation() {
        let (manager, section, _) = test_setup(8);
        let id = manager
            .start_animation(
                solid_request(Color::RED).with_run_count(RunCount::Infinite).with_delay(5),
                &section,
            )
            .unwrap();
        assert!(manager.is_running(&id));

        manager.end_animation(&id);
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
        manager.prune_finished();
        assert!(!manager.is_running(&id));
        assert!(manager.running_ids().is_empty());
    }

    #[test]
    fn end_all_stops_every_animation() {
        let (manager, section, _) = test_setup(16);
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                manager
                    .start_animation(
                        AnimationToRunParams::new("sparkle")
                            .with_run_count(RunCount::Infinite)
                            .with_delay(5),
                        &section,
                    )
                    .unwrap(),
            );
        }
        manager.end_all();
        for id in ids {
            assert!(manager.wait_for(&id, Duration::from_secs(5)), "{id} still running");
        }
    }

    #[test]
    fn ending_an_unknown_id_is_a_quiet_no_op() {
        let (manager, _, _) = test_setup(8);
        manager.end_animation("never-started");
        assert!(manager.wait_for("never-started", Duration::from_millis(10)));
    }

    #[test]
    fn concurrent_animations_on_disjoint_sections_both_land() {
        let (manager, root, _) = test_setup(10);
        let left = root.create_named("left", 0, 4).unwrap();
        let right = root.create_named("right", 5, 9).unwrap();

        let a = manager
            .start_animation(solid_request(Color::RED), &left)
            .unwrap();
        let b = manager
            .start_animation(solid_request(Color::BLUE), &right)
            .unwrap();
        assert!(manager.wait_for(&a, Duration::from_secs(5)));
        assert!(manager.wait_for(&b, Duration::from_secs(5)));

        for i in 0..5 {
            assert_eq!(root.prolonged_color(i).unwrap(), Color::RED);
        }
        for i in 5..10 {
            assert_eq!(root.prolonged_color(i).unwrap(), Color::BLUE);
        }
    }

    #[test]
    fn failing_animation_does_not_disturb_others() {
        let (manager, section, _) = test_setup(8);
        // Center beyond the section fails resolution synchronously.
        let err = manager
            .start_animation(
                AnimationToRunParams::new("ripple")
                    .with_color(ColorSequence::solid(Color::RED))
                    .with_center(99),
                &section,
            )
            .unwrap_err();
        assert!(matches!(err, Error::CenterOutOfSection { .. }));

        let ok = manager
            .start_animation(solid_request(Color::CYAN), &section)
            .unwrap();
        assert!(manager.wait_for(&ok, Duration::from_secs(5)));
        assert_eq!(section.prolonged_color(0).unwrap(), Color::CYAN);
    }

    struct EventRecorder {
        events: Mutex<Vec<String>>,
    }

    impl StripObserver for EventRecorder {
        fn animation_started(&self, params: &RunningAnimationParams) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", params.animation));
        }

        fn animation_ended(&self, params: &RunningAnimationParams) {
            self.events
                .lock()
                .unwrap()
                .push(format!("end:{}", params.animation));
        }
    }

    #[test]
    fn lifecycle_hooks_fire_exactly_once_per_run() {
        let (manager, section, observers) = test_setup(8);
        let recorder = Arc::new(EventRecorder {
            events: Mutex::new(Vec::new()),
        });
        observers.set(recorder.clone());

        let id = manager
            .start_animation(
                solid_request(Color::RED).with_run_count(RunCount::Count(3)),
                &section,
            )
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
        // The ended hook runs just before the done latch; give it a moment.
        thread::sleep(Duration::from_millis(50));

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["start:solid".to_string(), "end:solid".to_string()]);
    }

    #[test]
    fn cancelled_animation_still_reports_its_end() {
        let (manager, section, observers) = test_setup(8);
        let recorder = Arc::new(EventRecorder {
            events: Mutex::new(Vec::new()),
        });
        observers.set(recorder.clone());

        let id = manager
            .start_animation(
                solid_request(Color::RED).with_run_count(RunCount::Infinite).with_delay(5),
                &section,
            )
            .unwrap();
        thread::sleep(Duration::from_millis(30));
        manager.end_animation(&id);
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(50));

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| e.starts_with("end:")).count(), 1);
    }

    #[test]
    fn ordered_group_cycles_members_round_robin() {
        let (manager, section, observers) = test_setup(8);
        let recorder = Arc::new(EventRecorder {
            events: Mutex::new(Vec::new()),
        });
        observers.set(recorder.clone());

        manager.register(
            AnimationDefinition::ordered_group(
                "cycle",
                vec!["solid".to_string(), "wipe".to_string()],
            )
            .with_default_run_count(RunCount::Count(4)),
        );

        let id = manager
            .start_animation(
                AnimationToRunParams::new("cycle")
                    .with_color(ColorSequence::solid(Color::RED))
                    .with_delay(1),
                &section,
            )
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(50));

        let events = recorder.events.lock().unwrap();
        let starts: Vec<String> = events
            .iter()
            .filter(|e| e.starts_with("start:") && !e.contains("cycle"))
            .cloned()
            .collect();
        assert_eq!(
            starts,
            vec!["start:solid", "start:wipe", "start:solid", "start:wipe"]
        );
    }

    #[test]
    fn group_timeout_ends_long_running_members() {
        let (manager, section, _) = test_setup(8);
        manager.register(
            AnimationDefinition::ordered_group("bounded", vec!["sparkle".to_string()])
                .with_member_timeout(100)
                .with_default_run_count(RunCount::Count(1)),
        );

        // Sparkle defaults to an infinite run; without the timeout this
        // group would never finish.
        let started = Instant::now();
        let id = manager
            .start_animation(AnimationToRunParams::new("bounded").with_delay(5), &section)
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        // The member was ended too, nothing should still be running.
        thread::sleep(Duration::from_millis(100));
        assert!(manager.running_ids().is_empty());
    }

    #[test]
    fn cancelling_a_group_ends_its_running_member() {
        let (manager, section, _) = test_setup(8);
        manager.register(AnimationDefinition::ordered_group(
            "endless",
            vec!["sparkle".to_string()],
        ));

        let id = manager
            .start_animation(AnimationToRunParams::new("endless").with_delay(5), &section)
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        manager.end_animation(&id);
        assert!(manager.wait_for(&id, Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(200));
        manager.prune_finished();
        assert!(manager.running_ids().is_empty());
    }

    #[test]
    fn randomized_group_draws_only_registered_members() {
        let (manager, section, observers) = test_setup(8);
        let recorder = Arc::new(EventRecorder {
            events: Mutex::new(Vec::new()),
        });
        observers.set(recorder.clone());

        manager.register(
            AnimationDefinition::randomized_group(
                "shuffle",
                vec!["solid".to_string(), "wipe".to_string()],
            )
            .with_default_run_count(RunCount::Count(5)),
        );

        let id = manager
            .start_animation(
                AnimationToRunParams::new("shuffle")
                    .with_color(ColorSequence::solid(Color::CYAN))
                    .with_delay(1),
                &section,
            )
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(50));

        // Five cycles, each drawing one of the two members; which member is
        // up to the rng, so assert membership rather than order.
        let events = recorder.events.lock().unwrap();
        let starts: Vec<String> = events
            .iter()
            .filter(|e| e.starts_with("start:") && !e.contains("shuffle"))
            .cloned()
            .collect();
        assert_eq!(starts.len(), 5, "member starts: {starts:?}");
        for start in &starts {
            assert!(
                start == "start:solid" || start == "start:wipe",
                "unexpected member {start}"
            );
        }
        // Both members paint the group color over the whole section.
        for i in 0..8 {
            assert_eq!(section.prolonged_color(i).unwrap(), Color::CYAN);
        }
    }

    #[test]
    fn cancelling_a_randomized_group_stops_the_draw() {
        let (manager, section, _) = test_setup(8);
        manager.register(AnimationDefinition::randomized_group(
            "restless",
            vec!["sparkle".to_string()],
        ));

        let id = manager
            .start_animation(AnimationToRunParams::new("restless").with_delay(5), &section)
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        manager.end_animation(&id);
        assert!(manager.wait_for(&id, Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(200));
        manager.prune_finished();
        assert!(manager.running_ids().is_empty());
    }

    #[test]
    fn custom_registered_animation_runs() {
        fn paint_ends(
            section: &Section,
            params: &RunningAnimationParams,
            _token: &CancelToken,
        ) -> Result<()> {
            let colors = params.color_at(0);
            let last = section.num_leds() - 1;
            section.set_prolonged(0, colors.get(0))?;
            section.set_prolonged(last, colors.get(last))?;
            Ok(())
        }

        let (manager, section, _) = test_setup(6);
        manager.register(AnimationDefinition::leaf("paint_ends", paint_ends));
        assert!(manager.animation_names().contains(&"paint_ends".to_string()));

        let id = manager
            .start_animation(
                AnimationToRunParams::new("paint_ends")
                    .with_color(ColorSequence::solid(Color::MAGENTA)),
                &section,
            )
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(5)));
        assert_eq!(section.prolonged_color(0).unwrap(), Color::MAGENTA);
        assert_eq!(section.prolonged_color(5).unwrap(), Color::MAGENTA);
        assert_eq!(section.prolonged_color(2).unwrap(), Color::BLACK);
    }

    #[test]
    fn backward_direction_is_passed_through_to_members() {
        let (manager, section, _) = test_setup(8);
        manager.register(
            AnimationDefinition::ordered_group("sweep", vec!["wipe".to_string()])
                .with_default_run_count(RunCount::Count(1)),
        );

        let id = manager
            .start_animation(
                AnimationToRunParams::new("sweep")
                    .with_color(ColorSequence::solid(Color::YELLOW))
                    .with_direction(Direction::Backward)
                    .with_delay(1),
                &section,
            )
            .unwrap();
        assert!(manager.wait_for(&id, Duration::from_secs(10)));
        for i in 0..8 {
            assert_eq!(section.prolonged_color(i).unwrap(), Color::YELLOW);
        }
    }
}
