/// Static keyword categories and target markets
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of motivation niches, each mapped to ten fixed search phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NicheCategory {
    General,
    Success,
    Money,
    Mindset,
    Entrepreneurship,
    Discipline,
    SelfLove,
    LeaderQuotes,
    Career,
    Overcoming,
    Goals,
    PeaceOfMind,
}

impl NicheCategory {
    pub fn all() -> &'static [NicheCategory] {
        &[
            NicheCategory::General,
            NicheCategory::Success,
            NicheCategory::Money,
            NicheCategory::Mindset,
            NicheCategory::Entrepreneurship,
            NicheCategory::Discipline,
            NicheCategory::SelfLove,
            NicheCategory::LeaderQuotes,
            NicheCategory::Career,
            NicheCategory::Overcoming,
            NicheCategory::Goals,
            NicheCategory::PeaceOfMind,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NicheCategory::General => "Motivación General",
            NicheCategory::Success => "Éxito y Superación",
            NicheCategory::Money => "Dinero y Riqueza",
            NicheCategory::Mindset => "Mentalidad y Mindset",
            NicheCategory::Entrepreneurship => "Emprendimiento",
            NicheCategory::Discipline => "Disciplina y Hábitos",
            NicheCategory::SelfLove => "Amor Propio y Autoestima",
            NicheCategory::LeaderQuotes => "Frases de Líderes",
            NicheCategory::Career => "Trabajo y Carrera",
            NicheCategory::Overcoming => "Superación de Problemas",
            NicheCategory::Goals => "Metas y Objetivos",
            NicheCategory::PeaceOfMind => "Paz Mental y Bienestar",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            NicheCategory::General => &[
                "motivación español",
                "motivación personal",
                "frases motivacionales",
                "motivación diaria",
                "palabras de motivación",
                "motivación para la vida",
                "mensajes motivacionales",
                "reflexiones motivacionales",
                "motivación cortos",
                "motivación shorts",
            ],
            NicheCategory::Success => &[
                "éxito personal",
                "superación personal",
                "cómo tener éxito",
                "mentalidad de éxito",
                "historias de éxito",
                "claves del éxito",
                "éxito en la vida",
                "secretos del éxito",
                "camino al éxito",
                "mentalidad ganadora",
            ],
            NicheCategory::Money => &[
                "motivación dinero",
                "mentalidad millonaria",
                "riqueza mentalidad",
                "libertad financiera",
                "éxito financiero",
                "cómo ser rico",
                "dinero y éxito",
                "abundancia financiera",
                "mentalidad de rico",
                "educación financiera motivación",
            ],
            NicheCategory::Mindset => &[
                "mentalidad positiva",
                "cambiar mentalidad",
                "mentalidad de crecimiento",
                "psicología del éxito",
                "mente millonaria",
                "reprogramar la mente",
                "mentalidad fuerte",
                "poder de la mente",
                "actitud mental positiva",
                "mentalidad emprendedora",
            ],
            NicheCategory::Entrepreneurship => &[
                "motivación emprendedor",
                "emprendimiento shorts",
                "consejos emprendedores",
                "éxito emprendedor",
                "historias emprendedores",
                "mentalidad emprendedora",
                "cómo emprender",
                "negocios motivación",
                "emprender desde cero",
                "ser tu propio jefe",
            ],
            NicheCategory::Discipline => &[
                "disciplina personal",
                "hábitos exitosos",
                "rutina de éxito",
                "autodisciplina",
                "hábitos millonarios",
                "constancia y disciplina",
                "hábitos diarios éxito",
                "despertar temprano motivación",
                "productividad personal",
                "gestión del tiempo",
            ],
            NicheCategory::SelfLove => &[
                "amor propio",
                "autoestima alta",
                "quererse a uno mismo",
                "confianza en ti mismo",
                "valorarte a ti mismo",
                "aceptación personal",
                "empoderamiento personal",
                "creer en ti mismo",
                "fortaleza interior",
                "paz interior",
            ],
            NicheCategory::LeaderQuotes => &[
                "frases de éxito",
                "frases motivadoras famosos",
                "citas inspiradoras",
                "frases líderes mundiales",
                "palabras de sabios",
                "frases celebres motivación",
                "consejos de millonarios",
                "frases de emprendedores",
                "sabiduría de vida",
                "frases para reflexionar",
            ],
            NicheCategory::Career => &[
                "motivación laboral",
                "éxito profesional",
                "crecer en el trabajo",
                "desarrollo profesional",
                "carrera exitosa",
                "motivación para trabajar",
                "liderazgo personal",
                "ser mejor profesional",
                "ascender en el trabajo",
                "pasión por el trabajo",
            ],
            NicheCategory::Overcoming => &[
                "superar obstáculos",
                "salir adelante",
                "nunca rendirse",
                "superar momentos difíciles",
                "resiliencia personal",
                "levantarse después de caer",
                "fortaleza mental",
                "superar el fracaso",
                "vencer el miedo",
                "transformar dolor en fuerza",
            ],
            NicheCategory::Goals => &[
                "lograr tus metas",
                "cumplir objetivos",
                "sueños y metas",
                "alcanzar tus sueños",
                "propósito de vida",
                "visualización de metas",
                "metas claras",
                "objetivos de vida",
                "planificar el éxito",
                "enfoque en metas",
            ],
            NicheCategory::PeaceOfMind => &[
                "paz mental",
                "tranquilidad interior",
                "bienestar emocional",
                "equilibrio vida",
                "calma interior",
                "mente tranquila",
                "serenidad personal",
                "vivir en paz",
                "soltar y avanzar",
                "mindfulness español",
            ],
        }
    }
}

impl Default for NicheCategory {
    fn default() -> Self {
        NicheCategory::General
    }
}

impl fmt::Display for NicheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A searchable market
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
}

/// Spanish-speaking markets, ISO 3166-1 alpha-2
pub const REGIONS: &[Region] = &[
    Region { code: "ES", name: "España" },
    Region { code: "MX", name: "México" },
    Region { code: "AR", name: "Argentina" },
    Region { code: "CO", name: "Colombia" },
    Region { code: "CL", name: "Chile" },
    Region { code: "PE", name: "Perú" },
    Region { code: "VE", name: "Venezuela" },
    Region { code: "EC", name: "Ecuador" },
    Region { code: "GT", name: "Guatemala" },
    Region { code: "CU", name: "Cuba" },
    Region { code: "BO", name: "Bolivia" },
    Region { code: "DO", name: "República Dominicana" },
    Region { code: "HN", name: "Honduras" },
    Region { code: "PY", name: "Paraguay" },
    Region { code: "SV", name: "El Salvador" },
    Region { code: "NI", name: "Nicaragua" },
    Region { code: "CR", name: "Costa Rica" },
    Region { code: "PA", name: "Panamá" },
    Region { code: "UY", name: "Uruguay" },
    Region { code: "US", name: "USA (Hispanic)" },
];

/// Look up a region by code, case-insensitively
pub fn find_region(code: &str) -> Option<&'static Region> {
    let code = code.trim();
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}
