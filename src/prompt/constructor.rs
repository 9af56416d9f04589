//! Seeded prompt construction from fixed slot tables.
//!
//! Each call owns its random source: one template draw, then one draw per slot
//! in `Slot::DRAW_ORDER`. Every slot is drawn even when the chosen template
//! does not reference it, so both templates consume the stream identically.
//! The rendered sentence gets a `--negative:` suffix listing `NEGATIVE_TERMS`.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::BackendKind;
use crate::prompt::tables::{
    ACCESSORIES, AGE_RANGES, BACKGROUNDS, CAMERA, COATS, ETHNICITIES, GENDERS, HAIR_STYLES, LIGHTING,
    NEGATIVE_TERMS, POSES, STYLE_QUALIFIERS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Style,
    Camera,
    Age,
    Gender,
    Ethnicity,
    Hair,
    Coat,
    Accessory,
    Pose,
    Background,
    Lighting,
}

impl Slot {
    /// Changing this order changes every prompt produced for a given seed.
    pub const DRAW_ORDER: [Slot; 11] = [
        Slot::Style,
        Slot::Camera,
        Slot::Age,
        Slot::Gender,
        Slot::Ethnicity,
        Slot::Hair,
        Slot::Coat,
        Slot::Accessory,
        Slot::Pose,
        Slot::Background,
        Slot::Lighting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Style => "style",
            Slot::Camera => "camera",
            Slot::Age => "age",
            Slot::Gender => "gender",
            Slot::Ethnicity => "ethnicity",
            Slot::Hair => "hair",
            Slot::Coat => "coat",
            Slot::Accessory => "accessory",
            Slot::Pose => "pose",
            Slot::Background => "background",
            Slot::Lighting => "lighting",
        }
    }

    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Slot::Style => STYLE_QUALIFIERS,
            Slot::Camera => CAMERA,
            Slot::Age => AGE_RANGES,
            Slot::Gender => GENDERS,
            Slot::Ethnicity => ETHNICITIES,
            Slot::Hair => HAIR_STYLES,
            Slot::Coat => COATS,
            Slot::Accessory => ACCESSORIES,
            Slot::Pose => POSES,
            Slot::Background => BACKGROUNDS,
            Slot::Lighting => LIGHTING,
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// One value per slot, indexed by draw position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlots([&'static str; 11]);

impl ResolvedSlots {
    fn draw<R: Rng>(rng: &mut R) -> Self {
        let mut values = [""; 11];
        for slot in Slot::DRAW_ORDER {
            values[slot.position()] = pick(rng, slot.candidates());
        }
        ResolvedSlots(values)
    }

    pub fn get(&self, slot: Slot) -> &'static str {
        self.0[slot.position()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Descriptive,
    Headshot,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::Descriptive, Template::Headshot];

    pub fn render(self, s: &ResolvedSlots) -> String {
        match self {
            Template::Descriptive => format!(
                "{}, {}, {}, {}, {}, {}, wearing a {} with {}, {}, {}, {}. No logos, no text.",
                s.get(Slot::Style),
                s.get(Slot::Camera),
                s.get(Slot::Age),
                s.get(Slot::Gender),
                s.get(Slot::Ethnicity),
                s.get(Slot::Hair),
                s.get(Slot::Coat),
                s.get(Slot::Accessory),
                s.get(Slot::Pose),
                s.get(Slot::Background),
                s.get(Slot::Lighting),
            ),
            Template::Headshot => format!(
                "{}, {}, {} {}, {} doctor, {}, {}, {}, professional headshot, {}, {}.",
                s.get(Slot::Style),
                s.get(Slot::Camera),
                s.get(Slot::Age),
                s.get(Slot::Gender),
                s.get(Slot::Ethnicity),
                s.get(Slot::Hair),
                s.get(Slot::Coat),
                s.get(Slot::Accessory),
                s.get(Slot::Background),
                s.get(Slot::Lighting),
            ),
        }
    }
}

fn pick<R: Rng>(rng: &mut R, candidates: &'static [&'static str]) -> &'static str {
    candidates[rng.gen_range(0..candidates.len())]
}

/// A single item's submission, built fresh per batch index.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub index: usize,
    pub prompt: String,
    pub negative: &'static [&'static str],
    pub seed: u32,
    pub backend: BackendKind,
}

impl GenerationRequest {
    pub fn negative_prompt(&self) -> String {
        self.negative.join(", ")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConstructor;

impl PromptConstructor {
    pub fn new() -> Self {
        PromptConstructor
    }

    /// Build a prompt for `seed`, or from entropy when no seed is given.
    pub fn build_prompt(&self, seed: Option<u64>) -> String {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let template = Template::ALL[rng.gen_range(0..Template::ALL.len())];
        let slots = ResolvedSlots::draw(&mut rng);
        format!("{} --negative: {}", template.render(&slots), NEGATIVE_TERMS.join(", "))
    }

    pub fn build_request(&self, index: usize, seed: u32, backend: BackendKind) -> GenerationRequest {
        GenerationRequest {
            index,
            prompt: self.build_prompt(Some(u64::from(seed))),
            negative: NEGATIVE_TERMS,
            seed,
            backend,
        }
    }
}
