use std::collections::HashSet;

use serde::Serialize;

use super::domain::{EvaluationSections, Section, SectionKind};

const PLANNING_AND_ORGANIZATION: [&str; 4] = [
    "Creación de la agenda semanal de actividades",
    "Organización de subtareas en ASANA",
    "Seguimiento de objetivos institucionales",
    "Solicitud de Coaching y Autoevaluación",
];

const NON_NEGOTIABLES: [&str; 15] = [
    "Saludar y sonreír",
    "Ponerse de pie al recibir a nuestros públicos",
    "Contestar buenas tardes al teléfono",
    "Contestar mínimo de recibido los correos electrónicos",
    "Dar a conocer su punto de vista cuidando las formas en las reuniones directivas",
    "Tomar momentos de descanso productivos",
    "Seguimiento a las tareas de coaching",
    "Respirar profundamente antes de comenzar a resolver una crisis laboral",
    "Promover los valores empresariales",
    "Utilizar ASANA para planificar todas las actividades",
    "Visitar los espacios de trabajo",
    "Brindar retroalimentación a su equipo de colaboración",
    "Tener reuniones semanales con el personal administrativo",
    "Seguir los procesos establecidos de manera institucional",
    "Utilizar todas las herramientas tecnológicas disponibles para mejorar mi trabajo",
];

const SYSTEMS_USAGE: [&str; 6] = [
    "Conocimiento intermedio de ASANA",
    "Conocimiento de CONTPAQ",
    "Conocimiento de Gsuite",
    "Conocimiento medio de Excel",
    "Conocimiento medio de PowerPoint",
    "Uso de reportes administrativos para diseñar tácticas",
];

const PRODUCT_KNOWLEDGE: [&str; 8] = [
    "Conocimiento de la visión institucional",
    "Conocimiento de la misión institucional",
    "Conocimiento de OCEANOS AZULES HERFLO",
    "Conocimiento de OCEANOS AZULES ADVANCED",
    "Conocimiento de los valores institucionales",
    "Creación de diferenciadores sólidos",
    "Conocimiento de la estructura organizacional",
    "Conocimiento de precios y características",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Read-only, ordered competency names for each section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetencyCatalog {
    sections: [Vec<String>; 4],
}

impl CompetencyCatalog {
    /// The catalog shipped with the coaching program (4, 15, 6 and 8 competencies).
    pub fn reference() -> Self {
        Self {
            sections: [
                owned(&PLANNING_AND_ORGANIZATION),
                owned(&NON_NEGOTIABLES),
                owned(&SYSTEMS_USAGE),
                owned(&PRODUCT_KNOWLEDGE),
            ],
        }
    }

    /// Build a catalog from explicit lists. Every section must be present, non-empty and
    /// free of duplicate names.
    pub fn new<I>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (SectionKind, Vec<String>)>,
    {
        let mut sections: [Option<Vec<String>>; 4] = Default::default();

        for (kind, competencies) in entries {
            let competencies: Vec<String> = competencies
                .into_iter()
                .map(|name| name.trim().to_string())
                .collect();

            if competencies.iter().any(|name| name.is_empty()) {
                return Err(CatalogError::BlankCompetency(kind));
            }
            if competencies.is_empty() {
                return Err(CatalogError::EmptySection(kind));
            }

            let mut seen = HashSet::new();
            if let Some(duplicate) = competencies.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(CatalogError::DuplicateCompetency {
                    section: kind,
                    competency: duplicate.clone(),
                });
            }

            sections[kind.index()] = Some(competencies);
        }

        let [planning, non_negotiables, systems, product] = sections;
        Ok(Self {
            sections: [
                planning.ok_or(CatalogError::MissingSection(SectionKind::PlanningAndOrganization))?,
                non_negotiables.ok_or(CatalogError::MissingSection(SectionKind::NonNegotiables))?,
                systems.ok_or(CatalogError::MissingSection(SectionKind::SystemsUsage))?,
                product.ok_or(CatalogError::MissingSection(SectionKind::ProductKnowledge))?,
            ],
        })
    }

    pub fn competencies(&self, kind: SectionKind) -> &[String] {
        &self.sections[kind.index()]
    }

    pub fn contains(&self, kind: SectionKind, competency: &str) -> bool {
        self.competencies(kind)
            .iter()
            .any(|name| name == competency)
    }

    pub fn total(&self) -> usize {
        self.sections.iter().map(Vec::len).sum()
    }

    /// Fresh sections with every competency present and unrated.
    pub fn unrated_sections(&self) -> EvaluationSections {
        EvaluationSections {
            planning_and_organization: Section::unrated(
                self.competencies(SectionKind::PlanningAndOrganization)
                    .iter()
                    .cloned(),
            ),
            non_negotiables: Section::unrated(
                self.competencies(SectionKind::NonNegotiables).iter().cloned(),
            ),
            systems_usage: Section::unrated(
                self.competencies(SectionKind::SystemsUsage).iter().cloned(),
            ),
            product_knowledge: Section::unrated(
                self.competencies(SectionKind::ProductKnowledge)
                    .iter()
                    .cloned(),
            ),
        }
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            sections: SectionKind::ordered()
                .into_iter()
                .map(|kind| CatalogSectionView {
                    section: kind,
                    label: kind.label(),
                    competencies: self.competencies(kind).to_vec(),
                })
                .collect(),
        }
    }
}

impl Default for CompetencyCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub sections: Vec<CatalogSectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSectionView {
    pub section: SectionKind,
    pub label: &'static str,
    pub competencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("section {0} is missing from the catalog")]
    MissingSection(SectionKind),
    #[error("section {0} has no competencies")]
    EmptySection(SectionKind),
    #[error("section {0} contains a blank competency name")]
    BlankCompetency(SectionKind),
    #[error("competency '{competency}' appears twice in section {section}")]
    DuplicateCompetency {
        section: SectionKind,
        competency: String,
    },
}
