use crate::model::Advice;

/// A disease class the classifier can emit, with its canned description.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseClass {
    pub name: &'static str,
    pub info: &'static str,
    pub treatment: &'static str,
}

pub const DISEASE_CLASSES: &[DiseaseClass] = &[
    DiseaseClass {
        name: "Acne and Rosacea",
        info: "Chronic inflammatory skin condition affecting the face.",
        treatment: "Topical retinoids, antibiotics, or isotretinoin.",
    },
    DiseaseClass {
        name: "Actinic Keratosis",
        info: "Rough, scaly patch on skin caused by years of sun exposure. Includes Basal Cell Carcinoma and Malignant Lesions.",
        treatment: "Cryotherapy (freezing), topical chemotherapy, or photodynamic therapy.",
    },
    DiseaseClass {
        name: "Atopic Dermatitis",
        info: "Condition that makes skin red and itchy. Often confused with general Eczema.",
        treatment: "Moisturizers, topical corticosteroids, and avoiding triggers.",
    },
    DiseaseClass {
        name: "Bullous Disease",
        info: "A group of rare conditions that cause blisters on the skin.",
        treatment: "Corticosteroids and immunosuppressive drugs.",
    },
    DiseaseClass {
        name: "Cellulitis",
        info: "Common, potentially serious bacterial skin infection including Impetigo.",
        treatment: "Oral or intravenous antibiotics.",
    },
    DiseaseClass {
        name: "Eczema",
        info: "Condition that makes skin red, itchy, and inflamed.",
        treatment: "Moisturizers, topical corticosteroids, and avoiding triggers.",
    },
    DiseaseClass {
        name: "Exanthems and Drug Eruptions",
        info: "Widespread rash that can occur as a reaction to medication or infection.",
        treatment: "Discontinue the causing drug; antihistamines for itching.",
    },
    DiseaseClass {
        name: "Hair Loss (Alopecia)",
        info: "Partial or complete absence of hair from areas of the body, and other hair diseases.",
        treatment: "Minoxidil, finasteride, or immunotherapy depending on cause.",
    },
    DiseaseClass {
        name: "Herpes HPV and other STDs",
        info: "Viral infections causing sores or growths.",
        treatment: "Antiviral medications (e.g., Acyclovir) or physical removal of warts.",
    },
    DiseaseClass {
        name: "Melanoma Skin Cancer",
        info: "The most serious type of skin cancer. Also includes Nevi and Moles.",
        treatment: "Surgical excision is the primary treatment; immunotherapy/chemotherapy for advanced cases.",
    },
    DiseaseClass {
        name: "Nail Fungus",
        info: "Fungal infection of the nail and other nail diseases.",
        treatment: "Oral antifungal drugs or medicated nail polish.",
    },
    DiseaseClass {
        name: "Psoriasis",
        info: "Skin cells build up and form scales and itchy, dry patches. Includes Lichen Planus.",
        treatment: "Topical corticosteroids, light therapy, and systemic medications.",
    },
    DiseaseClass {
        name: "Urticaria Hives",
        info: "Red, itchy welts that result from a skin reaction.",
        treatment: "Antihistamines and identifying/avoiding triggers.",
    },
];

const DEFAULT_SYMPTOMS: &str = "Consult your doctor for a detailed evaluation.";
const DEFAULT_TREATMENT: &str = "Medical advice recommended.";

/// Canned advice for a diagnosis label. A class matches when its name equals
/// the label or appears inside it, ignoring case; the first match in catalog
/// order wins.
pub fn static_advice(diagnosis: &str) -> Advice {
    let label = diagnosis.to_lowercase();
    let hit = DISEASE_CLASSES.iter().find(|c| {
        let name = c.name.to_lowercase();
        name == label || label.contains(&name)
    });
    match hit {
        Some(c) => Advice {
            symptoms: c.info.to_string(),
            treatment: c.treatment.to_string(),
        },
        None => Advice {
            symptoms: DEFAULT_SYMPTOMS.to_string(),
            treatment: DEFAULT_TREATMENT.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case() {
        let advice = static_advice("psoriasis");
        assert!(advice.symptoms.starts_with("Skin cells build up"));
    }

    #[test]
    fn label_containing_class_name_matches() {
        let advice = static_advice("Suspected Eczema (mild)");
        assert_eq!(advice.symptoms, "Condition that makes skin red, itchy, and inflamed.");
    }

    #[test]
    fn unknown_label_gets_default() {
        let advice = static_advice("Sunburn");
        assert_eq!(advice.symptoms, DEFAULT_SYMPTOMS);
        assert_eq!(advice.treatment, DEFAULT_TREATMENT);
    }

    #[test]
    fn catalog_has_thirteen_classes() {
        assert_eq!(DISEASE_CLASSES.len(), 13);
    }
}
