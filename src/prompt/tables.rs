//! Fixed candidate lists for every prompt slot.

pub static STYLE_QUALIFIERS: &[&str] = &["realistic photo", "ultra-photorealistic", "professional headshot"];

pub static CAMERA: &[&str] = &["high detail, photorealistic", "35mm portrait lens look", "8k photo"];

pub static AGE_RANGES: &[&str] = &[
    "late 20s",
    "early 30s",
    "mid 30s",
    "late 30s",
    "early 40s",
    "mid 40s",
    "50s",
];

pub static GENDERS: &[&str] = &["male", "female", "non-binary"];

pub static ETHNICITIES: &[&str] = &[
    "South Asian",
    "East Asian",
    "Southeast Asian",
    "Middle Eastern",
    "Black",
    "White",
    "Latino",
    "Mixed race",
];

pub static HAIR_STYLES: &[&str] = &[
    "short neat hair",
    "short curly hair",
    "shoulder-length hair",
    "bald",
    "tied back hair",
];

pub static COATS: &[&str] = &["white lab coat", "surgical scrubs"];

pub static ACCESSORIES: &[&str] = &[
    "stethoscope",
    "ID badge",
    "white lab coat",
    "surgical scrubs",
    "reading glasses",
    "face mask hanging",
];

pub static POSES: &[&str] = &["head and shoulders portrait", "3/4 view portrait", "slight smile, professional"];

pub static BACKGROUNDS: &[&str] = &[
    "hospital corridor softly blurred",
    "clinic reception softly blurred",
    "professional studio backdrop",
    "medical office with bookshelves softly blurred",
];

pub static LIGHTING: &[&str] = &["soft natural lighting", "studio lighting with softbox", "warm clinical lighting"];

/// Terms appended after `--negative:` and sent as the local backend's negative prompt.
pub static NEGATIVE_TERMS: &[&str] = &["cartoon", "drawing", "low-res", "watermark", "blurry", "deformed", "text", "logo"];
