//! Cooperative, single-threaded task registry.
//!
//! Nothing here runs on its own: the owner calls [`Scheduler::advance`] once per
//! update tick and [`Scheduler::render_frame`] once per render tick. Delayed work
//! is represented as plain action values of type `A` that `advance` hands back
//! to the caller in firing order, so a fired action can never observe the
//! registry mid-iteration.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChronometerId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

/// Per-render-tick visual progression of a looped task.
pub trait Animation {
    fn on_frame(&mut self);
}

impl Animation for () {
    fn on_frame(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timer {
    active: bool,
    time: f64,
}

impl Timer {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_timeout(&self) -> bool {
        self.time <= 0.0
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    fn start(&mut self, seconds: f64) {
        self.time = seconds;
        self.active = true;
    }

    // Returns whether the timer still wants ticks. Deactivation lands on the
    // tick after the countdown reaches zero.
    fn advance(&mut self, dt: f64) -> bool {
        if !self.active {
            return false;
        }
        if self.time > 0.0 {
            self.time -= dt;
            true
        } else {
            self.active = false;
            false
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Chronometer {
    now: f64,
}

impl Chronometer {
    pub fn now(&self) -> f64 {
        self.now
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    Timer(TimerId),
    Chronometer(ChronometerId),
    Delay(u64),
}

#[derive(Debug)]
enum DelayPayload<A> {
    Action(A),
    EndLoop {
        animation: AnimationId,
        on_end: Option<A>,
    },
}

#[derive(Debug)]
struct DelayTask<A> {
    id: u64,
    timer: Timer,
    payload: DelayPayload<A>,
}

#[derive(Debug)]
struct LoopTask<V> {
    id: AnimationId,
    animation: V,
    frames: u64,
}

#[derive(Debug)]
pub struct Scheduler<A, V = ()> {
    timers: Vec<Timer>,
    chronometers: Vec<Chronometer>,
    delays: Vec<DelayTask<A>>,
    loops: Vec<LoopTask<V>>,
    registry: Vec<Task>,
    next_task_id: u64,
}

impl<A, V> Default for Scheduler<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V> Scheduler<A, V> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            chronometers: Vec::new(),
            delays: Vec::new(),
            loops: Vec::new(),
            registry: Vec::new(),
            next_task_id: 1,
        }
    }

    pub fn create_timer(&mut self) -> TimerId {
        self.timers.push(Timer::default());
        TimerId(self.timers.len() - 1)
    }

    pub fn timer(&self, id: TimerId) -> Timer {
        self.timers.get(id.0).copied().unwrap_or_default()
    }

    pub fn start_timer(&mut self, id: TimerId, seconds: f64) {
        let Some(timer) = self.timers.get_mut(id.0) else {
            return;
        };
        timer.start(seconds);
        self.register(Task::Timer(id));
    }

    pub fn create_chronometer(&mut self, auto_start: bool) -> ChronometerId {
        self.chronometers.push(Chronometer::default());
        let id = ChronometerId(self.chronometers.len() - 1);
        if auto_start {
            self.register(Task::Chronometer(id));
        }
        id
    }

    pub fn chronometer(&self, id: ChronometerId) -> Chronometer {
        self.chronometers.get(id.0).copied().unwrap_or_default()
    }

    pub fn is_chronometer_paused(&self, id: ChronometerId) -> bool {
        !self.registry.contains(&Task::Chronometer(id))
    }

    pub fn start_chronometer(&mut self, id: ChronometerId) {
        let Some(chronometer) = self.chronometers.get_mut(id.0) else {
            return;
        };
        chronometer.now = 0.0;
        self.register(Task::Chronometer(id));
    }

    pub fn stop_chronometer(&mut self, id: ChronometerId, reset: bool) {
        self.unregister(Task::Chronometer(id));
        if reset {
            if let Some(chronometer) = self.chronometers.get_mut(id.0) {
                chronometer.now = 0.0;
            }
        }
    }

    /// Hands `action` back from `advance` exactly once, on the tick the
    /// countdown runs out. There is no cancellation.
    pub fn delay(&mut self, seconds: f64, action: A) {
        self.push_delay(seconds, DelayPayload::Action(action));
    }

    /// Runs `animation` once per render frame for `seconds` of update time,
    /// then drops it and hands `on_end` back from `advance`.
    pub fn loop_for(&mut self, seconds: f64, animation: V, on_end: Option<A>) -> AnimationId {
        let id = AnimationId(self.next_task_id);
        self.next_task_id += 1;
        self.loops.push(LoopTask {
            id,
            animation,
            frames: 0,
        });
        self.push_delay(
            seconds,
            DelayPayload::EndLoop {
                animation: id,
                on_end,
            },
        );
        id
    }

    pub fn advance(&mut self, dt: f64) -> Vec<A> {
        let mut fired = Vec::new();
        let snapshot = self.registry.clone();
        for task in snapshot {
            match task {
                Task::Timer(id) => {
                    let keep = self
                        .timers
                        .get_mut(id.0)
                        .map(|timer| timer.advance(dt))
                        .unwrap_or(false);
                    if !keep {
                        self.unregister(task);
                    }
                }
                Task::Chronometer(id) => {
                    if let Some(chronometer) = self.chronometers.get_mut(id.0) {
                        chronometer.now += dt;
                    }
                }
                Task::Delay(id) => {
                    let Some(pos) = self.delays.iter().position(|delay| delay.id == id) else {
                        self.unregister(task);
                        continue;
                    };
                    self.delays[pos].timer.advance(dt);
                    if !self.delays[pos].timer.is_timeout() {
                        continue;
                    }
                    let done = self.delays.remove(pos);
                    self.unregister(task);
                    match done.payload {
                        DelayPayload::Action(action) => fired.push(action),
                        DelayPayload::EndLoop { animation, on_end } => {
                            self.loops.retain(|task| task.id != animation);
                            fired.extend(on_end);
                        }
                    }
                }
            }
        }
        fired
    }

    pub fn animations(&self) -> impl Iterator<Item = &V> {
        self.loops.iter().map(|task| &task.animation)
    }

    pub fn animation_frames(&self, id: AnimationId) -> Option<u64> {
        self.loops
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.frames)
    }

    pub fn pending_delays(&self) -> usize {
        self.delays.len()
    }

    pub fn is_timer_registered(&self, id: TimerId) -> bool {
        self.registry.contains(&Task::Timer(id))
    }

    fn push_delay(&mut self, seconds: f64, payload: DelayPayload<A>) {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let mut timer = Timer::default();
        timer.start(seconds);
        self.delays.push(DelayTask { id, timer, payload });
        self.register(Task::Delay(id));
    }

    fn register(&mut self, task: Task) {
        if !self.registry.contains(&task) {
            self.registry.push(task);
        }
    }

    fn unregister(&mut self, task: Task) {
        self.registry.retain(|registered| *registered != task);
    }
}

impl<A, V: Animation> Scheduler<A, V> {
    pub fn render_frame(&mut self) {
        for task in &mut self.loops {
            task.animation.on_frame();
            task.frames += 1;
        }
    }
}
