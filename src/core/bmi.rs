//! The five BMI categories used by the bot, with Asian-Pacific cut-offs.

/// Label used when the classifier reports a category outside the table
pub const UNKNOWN_LABEL: &str = "ไม่สามารถระบุหมวดหมู่ได้";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
    SeverelyObese,
}

/// All categories in class-index order
pub const CATEGORIES: [BmiCategory; 5] = [
    BmiCategory::Underweight,
    BmiCategory::Normal,
    BmiCategory::Overweight,
    BmiCategory::Obese,
    BmiCategory::SeverelyObese,
];

impl BmiCategory {
    /// Look up a classifier class index. Out-of-range indices return `None`.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| CATEGORIES.get(i))
            .copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Bucket a BMI value. Lower edges are inclusive, upper edges exclusive.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 23.0 {
            BmiCategory::Normal
        } else if bmi < 25.0 {
            BmiCategory::Overweight
        } else if bmi < 30.0 {
            BmiCategory::Obese
        } else {
            BmiCategory::SeverelyObese
        }
    }

    /// Resolve a class name as emitted by the various classifier releases
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "underweight" | "thin" => Some(BmiCategory::Underweight),
            "normal" | "healthy" => Some(BmiCategory::Normal),
            "overweight" => Some(BmiCategory::Overweight),
            "obese" | "obese_1" | "obesity_1" | "obese_i" => Some(BmiCategory::Obese),
            "severely_obese" | "obese_2" | "obesity_2" | "obese_ii" | "extremely_obese" => {
                Some(BmiCategory::SeverelyObese)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "น้ำหนักน้อยกว่าเกณฑ์ (ผอม)",
            BmiCategory::Normal => "น้ำหนักปกติ (สมส่วน)",
            BmiCategory::Overweight => "น้ำหนักเกิน (ท้วม)",
            BmiCategory::Obese => "โรคอ้วนระดับ 1",
            BmiCategory::SeverelyObese => "โรคอ้วนระดับ 2",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "ควรรับประทานอาหารให้ครบ 5 หมู่ และเพิ่มพลังงานให้เพียงพอนะงับ 🥺"
            }
            BmiCategory::Normal => "รักษาสุขภาพแบบนี้ต่อไป และออกกำลังกายสม่ำเสมอนะงับ 👍",
            BmiCategory::Overweight => "ลองควบคุมอาหารและออกกำลังกายเพิ่มขึ้นอีกนิดนะงับ 😅",
            BmiCategory::Obese => {
                "ควรลดอาหารหวาน มัน เค็ม และออกกำลังกายอย่างน้อย 150 นาทีต่อสัปดาห์นะงับ 🏃"
            }
            BmiCategory::SeverelyObese => {
                "มีความเสี่ยงต่อโรคแทรกซ้อน ควรปรึกษาแพทย์หรือนักโภชนาการนะงับ 🩺"
            }
        }
    }

    /// Illustration file name, relative to the configured image base URL
    pub fn image_file(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "bmi_0_underweight.png",
            BmiCategory::Normal => "bmi_1_normal.png",
            BmiCategory::Overweight => "bmi_2_overweight.png",
            BmiCategory::Obese => "bmi_3_obese.png",
            BmiCategory::SeverelyObese => "bmi_4_severely_obese.png",
        }
    }
}
