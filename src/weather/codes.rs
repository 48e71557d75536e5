/// Dutch description of a WMO weather interpretation code as reported by
/// Open-Meteo. Codes outside the table, and a missing code, are "Onbekend".
pub fn describe(code: Option<i32>) -> &'static str {
    match code {
        Some(0) => "Helder",
        Some(1 | 2 | 3) => "Gedeeltelijk bewolkt",
        Some(45 | 48) => "Mist",
        Some(51 | 53 | 55) => "Lichte motregen",
        Some(61 | 63 | 65) => "Regen",
        Some(71 | 73 | 75) => "Sneeuw",
        Some(95) => "Onweer",
        _ => "Onbekend",
    }
}
