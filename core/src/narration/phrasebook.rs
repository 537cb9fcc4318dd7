//! Language-tagged string tables
//!
//! Templates use `{name}` placeholders filled by [`fill`]. Tables are keyed
//! by the primary language subtag; unknown tags fall back to English.

use phf::phf_map;

#[derive(Debug)]
pub struct Phrasebook {
    pub language: &'static str,

    // ─── Screens ────────────────────────────────────────────────────────────
    pub idle: &'static str,
    pub posture: &'static str,
    /// `{set}`
    pub prep: &'static str,
    /// `{side}`
    pub lift: &'static str,
    /// `{side}`
    pub lower: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    /// `{set}` `{sets}` `{rep}` `{reps}`
    pub progress: &'static str,
    /// `{n}`
    pub seconds: &'static str,

    // ─── Set boundaries ─────────────────────────────────────────────────────
    /// `{set}`
    pub set_done: &'static str,
    /// `{next}`
    pub set_next: &'static str,
    /// `{set}` `{next}`
    pub set_transition_spoken: &'static str,
    pub finish: &'static str,
    pub finish_detail: &'static str,
    /// Spoken form of the finish screen, without emoji
    pub finish_spoken: &'static str,

    // ─── Trigger labels ─────────────────────────────────────────────────────
    pub trigger_ready: &'static str,
    pub trigger_running: &'static str,
    pub trigger_finished: &'static str,

    /// Spoken count words for 1, 2, 3, ...; digits past the end
    pub count_words: &'static [&'static str],
}

static ENGLISH: Phrasebook = Phrasebook {
    language: "en",
    idle: "Press the button to start.",
    posture: "Sit tall on the chair. Keep your back straight.",
    prep: "Starting set {set}. Get ready.",
    lift: "{side} leg up",
    lower: "{side} leg down",
    left: "Left",
    right: "Right",
    progress: "Set {set} of {sets} · Rep {rep} of {reps}",
    seconds: "{n} s",
    set_done: "Set {set} complete.",
    set_next: "Get ready for set {next}.",
    set_transition_spoken: "Set {set} complete. Get ready for set {next}.",
    finish: "Workout complete. Well done. 👍",
    finish_detail: "Great job!",
    finish_spoken: "Workout complete. Well done.",
    trigger_ready: "Start",
    trigger_running: "In progress…",
    trigger_finished: "Start again",
    count_words: &[],
};

static KOREAN: Phrasebook = Phrasebook {
    language: "ko",
    idle: "버튼을 눌러 운동을 시작하세요",
    posture: "의자에 바르게 앉으세요. 허리를 곧게 펴세요.",
    prep: "{set}세트 시작합니다. 준비하세요.",
    lift: "{side} 다리 올리세요",
    lower: "{side} 다리 내리세요",
    left: "왼쪽",
    right: "오른쪽",
    progress: "{set}/{sets}세트 · {rep}/{reps}회",
    seconds: "{n}초",
    set_done: "{set}세트 완료하셨습니다.",
    set_next: "{next}세트 시작 준비",
    set_transition_spoken: "{set}세트 완료하셨습니다. {next}세트 시작합니다. 준비하세요.",
    finish: "오늘 운동 완료! 👍",
    finish_detail: "오늘도 수고하셨어요",
    finish_spoken: "오늘 운동 완료! 오늘도 수고하셨어요",
    trigger_ready: "시작",
    trigger_running: "진행 중...",
    trigger_finished: "다시 시작",
    count_words: &["하나", "둘", "셋", "넷", "다섯"],
};

static PHRASEBOOKS: phf::Map<&'static str, &'static Phrasebook> = phf_map! {
    "en" => &ENGLISH,
    "ko" => &KOREAN,
};

/// Table for a BCP 47 tag such as "en-GB" or "ko-KR"
pub fn lookup(language_tag: &str) -> &'static Phrasebook {
    let primary = language_tag
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    PHRASEBOOKS.get(primary.as_str()).copied().unwrap_or(&ENGLISH)
}

/// Replace each `{key}` in `template` with its value
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

impl Phrasebook {
    pub fn count_word(&self, n: u32) -> String {
        n.checked_sub(1)
            .and_then(|i| self.count_words.get(i as usize))
            .map(|word| word.to_string())
            .unwrap_or_else(|| n.to_string())
    }
}
