//! Sound cues
//!
//! Which event makes which sound is decided here for every target; the
//! Web Audio synthesis itself only exists in the browser build.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bright ding
    CoinCollect,
    /// Noise burst and falling saw
    ObstacleCrash,
    /// Dull low knock
    ShrubThud,
    /// Whoosh and crackle
    ShrubFire,
    /// Low detuned growl
    YetiAppear,
    /// Roar
    YetiCatch,
}

impl SoundEffect {
    /// The cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CoinsCollected { .. } => Some(SoundEffect::CoinCollect),
            GameEvent::ObstacleCrash => Some(SoundEffect::ObstacleCrash),
            GameEvent::ShrubThudded { .. } => Some(SoundEffect::ShrubThud),
            GameEvent::ShrubIgnited { .. } => Some(SoundEffect::ShrubFire),
            GameEvent::YetiAppeared => Some(SoundEffect::YetiAppear),
            GameEvent::YetiCaught => Some(SoundEffect::YetiCatch),
            GameEvent::RunStarted { .. } | GameEvent::RunEnded(_) => None,
        }
    }
}

pub const SWOOSH_MAX_GAIN: f32 = 0.15;
pub const SWOOSH_MIN_HZ: f32 = 500.0;
pub const SWOOSH_MAX_HZ: f32 = 2000.0;

/// Gain and band-pass center for the skiing swoosh at `speed`
pub fn swoosh_level(speed: f32, max_speed: f32) -> (f32, f32) {
    let t = if max_speed > 0.0 && speed.is_finite() {
        (speed / max_speed).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (
        SWOOSH_MAX_GAIN * t,
        SWOOSH_MIN_HZ + (SWOOSH_MAX_HZ - SWOOSH_MIN_HZ) * t,
    )
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioBufferSourceNode, AudioContext, BiquadFilterNode, BiquadFilterType, GainNode,
        OscillatorNode, OscillatorType,
    };

    use super::{SoundEffect, swoosh_level};
    use crate::settings::Settings;

    /// Looping filtered noise that follows the skier's speed
    struct Swoosh {
        source: AudioBufferSourceNode,
        filter: BiquadFilterNode,
        gain: GainNode,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        swoosh: Option<Swoosh>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
                swoosh: None,
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if muted {
                self.set_swoosh(0.0, 1.0);
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::CoinCollect => self.play_coin(ctx, vol),
                SoundEffect::ObstacleCrash => self.play_crash(ctx, vol),
                SoundEffect::ShrubThud => self.play_thud(ctx, vol),
                SoundEffect::ShrubFire => self.play_fire(ctx, vol),
                SoundEffect::YetiAppear => self.play_growl(ctx, vol),
                SoundEffect::YetiCatch => self.play_roar(ctx, vol),
            }
        }

        /// Start the looping swoosh if it is not already running
        pub fn start_swoosh(&mut self) {
            if self.swoosh.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Some(source) = Self::noise_source(ctx, 2.0) else {
                return;
            };
            source.set_loop(true);
            let (Ok(filter), Ok(gain)) = (ctx.create_biquad_filter(), ctx.create_gain()) else {
                return;
            };
            filter.set_type(BiquadFilterType::Bandpass);
            filter.q().set_value(1.0);
            gain.gain().set_value(0.0);

            if source.connect_with_audio_node(&filter).is_err()
                || filter.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&ctx.destination()).is_err()
            {
                return;
            }
            source.start().ok();
            self.swoosh = Some(Swoosh {
                source,
                filter,
                gain,
            });
        }

        /// Track the skier's speed; glides over 100 ms to avoid zipper noise
        pub fn set_swoosh(&self, speed: f32, max_speed: f32) {
            let (Some(ctx), Some(swoosh)) = (&self.ctx, &self.swoosh) else {
                return;
            };
            let (gain, hz) = swoosh_level(speed, max_speed);
            let t = ctx.current_time() + 0.1;
            swoosh
                .gain
                .gain()
                .linear_ramp_to_value_at_time(gain * self.effective_volume(), t)
                .ok();
            swoosh.filter.frequency().linear_ramp_to_value_at_time(hz, t).ok();
        }

        pub fn stop_swoosh(&mut self) {
            if let Some(swoosh) = self.swoosh.take() {
                swoosh.source.stop().ok();
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// White noise buffer source, `seconds` long
        fn noise_source(ctx: &AudioContext, seconds: f32) -> Option<AudioBufferSourceNode> {
            let rate = ctx.sample_rate();
            let len = (rate * seconds) as u32;
            let buffer = ctx.create_buffer(1, len, rate).ok()?;
            let mut data: Vec<f32> = (0..len)
                .map(|_| (js_sys::Math::random() * 2.0 - 1.0) as f32)
                .collect();
            buffer.copy_to_channel(&mut data, 0).ok()?;
            let source = ctx.create_buffer_source().ok()?;
            source.set_buffer(Some(&buffer));
            Some(source)
        }

        /// Noise through a filter into its own gain
        fn filtered_noise(
            &self,
            ctx: &AudioContext,
            seconds: f32,
            filter_type: BiquadFilterType,
        ) -> Option<(AudioBufferSourceNode, BiquadFilterNode, GainNode)> {
            let source = Self::noise_source(ctx, seconds)?;
            let filter = ctx.create_biquad_filter().ok()?;
            let gain = ctx.create_gain().ok()?;
            filter.set_type(filter_type);
            source.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((source, filter, gain))
        }

        /// Coin - rising square ding
        fn play_coin(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(800.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1200.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Crash - low-passed noise burst over a falling saw
        fn play_crash(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((noise, filter, gain)) = self.filtered_noise(ctx, 0.3, BiquadFilterType::Lowpass) {
                filter.frequency().set_value_at_time(400.0, t).ok();
                filter
                    .frequency()
                    .exponential_ramp_to_value_at_time(100.0, t + 0.3)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                noise.start().ok();
                noise.stop_with_when(t + 0.3).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(50.0, t + 0.3)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }

        /// Shrub thud - short sine knock
        fn play_thud(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Shrub fire - band-passed whoosh, then a crackle
        fn play_fire(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((noise, filter, gain)) = self.filtered_noise(ctx, 0.2, BiquadFilterType::Bandpass) {
                filter.frequency().set_value_at_time(2000.0, t).ok();
                filter
                    .frequency()
                    .exponential_ramp_to_value_at_time(4000.0, t + 0.2)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                noise.start().ok();
                noise.stop_with_when(t + 0.2).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sawtooth) {
                osc.frequency().set_value_at_time(800.0, t + 0.1).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(1200.0, t + 0.3)
                    .ok();
                gain.gain().set_value_at_time(0.0, t + 0.1).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.2, t + 0.15)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t + 0.1).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }

        /// Yeti appears - two detuned saws sliding down
        fn play_growl(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (from, to) in [(80.0, 60.0), (83.0, 63.0)] {
                if let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Sawtooth) {
                    osc.frequency().linear_ramp_to_value_at_time(to, t + 0.8).ok();
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain()
                        .linear_ramp_to_value_at_time(vol * 0.2, t + 0.1)
                        .ok();
                    gain.gain()
                        .linear_ramp_to_value_at_time(vol * 0.15, t + 0.5)
                        .ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.8)
                        .ok();
                    osc.start().ok();
                    osc.stop_with_when(t + 0.8).ok();
                }
            }
        }

        /// Yeti catch - swelling low-passed roar over a sinking rumble
        fn play_roar(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((noise, filter, gain)) = self.filtered_noise(ctx, 0.6, BiquadFilterType::Lowpass) {
                filter.frequency().set_value_at_time(400.0, t).ok();
                filter
                    .frequency()
                    .linear_ramp_to_value_at_time(200.0, t + 0.3)
                    .ok();
                filter
                    .frequency()
                    .linear_ramp_to_value_at_time(100.0, t + 0.6)
                    .ok();
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.6, t + 0.05)
                    .ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.4, t + 0.3)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                noise.start().ok();
                noise.stop_with_when(t + 0.6).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.6)
                    .ok();
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.6).ok();
            }
        }
    }
}
