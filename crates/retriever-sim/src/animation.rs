//! Clip selection with cross-fade.
//!
//! Clips are looked up by lowercase name. Asking for a clip that does not exist is a no-op that
//! reports `false`, so callers can chain fallbacks (`play("idle1") || play("idleeartwitch")`).

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    pub duration: f32,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Playing {
    key: String,
    time: f32,
    weight: f32,
}

#[derive(Debug, Clone)]
pub struct Animator {
    clips: BTreeMap<String, Clip>,
    current: Option<Playing>,
    fading_out: Option<Playing>,
    fade_seconds: f32,
    switches: u32,
}

impl Animator {
    pub const DEFAULT_FADE_SECONDS: f32 = 0.15;

    pub fn new(clips: impl IntoIterator<Item = Clip>) -> Self {
        let clips = clips
            .into_iter()
            .map(|c| (c.name.to_lowercase(), c))
            .collect();
        Self {
            clips,
            current: None,
            fading_out: None,
            fade_seconds: Self::DEFAULT_FADE_SECONDS,
            switches: 0,
        }
    }

    /// Lowercase key of the clip currently fading in or playing.
    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.key.as_str())
    }

    /// Blend weight of the current clip (1.0 once the cross-fade completed).
    pub fn current_weight(&self) -> f32 {
        self.current.as_ref().map(|p| p.weight).unwrap_or(0.0)
    }

    /// How many times the active clip changed.
    pub fn switch_count(&self) -> u32 {
        self.switches
    }

    /// Start `name`, cross-fading from the active clip. Replaying the active clip does nothing.
    pub fn play(&mut self, name: &str) -> bool {
        let key = name.to_lowercase();
        if !self.clips.contains_key(&key) {
            return false;
        }
        if self.current() == Some(key.as_str()) {
            return true;
        }

        self.fading_out = self.current.take();
        self.current = Some(Playing {
            key,
            time: 0.0,
            weight: if self.fading_out.is_some() { 0.0 } else { 1.0 },
        });
        self.switches += 1;
        true
    }

    /// Play the first clip in name order; `false` when the animator has no clips.
    pub fn play_any(&mut self) -> bool {
        match self.clips.keys().next().cloned() {
            Some(key) => self.play(&key),
            None => false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let step = if self.fade_seconds <= 0.0 {
            1.0
        } else {
            dt / self.fade_seconds
        };

        if let Some(current) = self.current.as_mut() {
            current.weight = (current.weight + step).min(1.0);
            if let Some(clip) = self.clips.get(&current.key) {
                current.time = if clip.duration > 0.0 {
                    (current.time + dt) % clip.duration
                } else {
                    0.0
                };
            }
        }

        if let Some(out) = self.fading_out.as_mut() {
            out.weight -= step;
            if out.weight <= 0.0 {
                self.fading_out = None;
            }
        }
    }
}
