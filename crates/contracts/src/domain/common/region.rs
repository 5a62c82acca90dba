//! Справочник штатов для ферм и госпрограмм

pub const STATES: &[(&str, &str)] = &[
    ("andhra_pradesh", "Andhra Pradesh"),
    ("bihar", "Bihar"),
    ("gujarat", "Gujarat"),
    ("haryana", "Haryana"),
    ("karnataka", "Karnataka"),
    ("madhya_pradesh", "Madhya Pradesh"),
    ("maharashtra", "Maharashtra"),
    ("odisha", "Odisha"),
    ("punjab", "Punjab"),
    ("rajasthan", "Rajasthan"),
    ("tamil_nadu", "Tamil Nadu"),
    ("telangana", "Telangana"),
    ("uttar_pradesh", "Uttar Pradesh"),
    ("west_bengal", "West Bengal"),
];

/// Отображаемое имя штата; неизвестный код возвращается как есть
pub fn state_label(code: &str) -> &str {
    STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}
