//! Seed data
//!
//! The fixed initial dataset for each collection. On first start (or after a
//! reset) the store bootstraps from these; on later starts they are
//! reconciled against persisted data by [`crate::merge`].

use crate::model::{
    Gem, Project, ProjectLog, ProjectStatus, RepoKind, Repository, Skill, Tool, User, UserRole,
};

fn skill(name: &str, level: u8) -> Skill {
    Skill {
        name: name.to_string(),
        level,
    }
}

fn avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        name.replace(' ', "+")
    )
}

pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "u_gonzalo".to_string(),
            name: "Gonzalo Arias".to_string(),
            role: UserRole::Ceo,
            email: "gonzalo.arias@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: "https://ui-avatars.com/api/?name=Gonzalo+Arias&background=0D8ABC&color=fff"
                .to_string(),
            skills: vec![
                skill("Dirección General", 100),
                skill("Estrategia de Negocios", 98),
                skill("Gestión de Proyectos", 95),
            ],
            projects: vec![
                "PROYECTO_001".to_string(),
                "PROYECTO_002".to_string(),
                "PROYECTO_003".to_string(),
                "PROYECTO_004".to_string(),
            ],
        },
        User {
            id: "u_soporte".to_string(),
            name: "Soporte AIWIS".to_string(),
            role: UserRole::SuperAdmin,
            email: "soporte.aiwis@gmail.com".to_string(),
            password: Some(String::new()),
            avatar: "https://ui-avatars.com/api/?name=AIWIS+Root&background=000000&color=fff"
                .to_string(),
            skills: vec![
                skill("System Architecture", 100),
                skill("Database Management", 100),
                skill("Security", 100),
            ],
            projects: vec!["PROYECTO_001".to_string(), "PROYECTO_004".to_string()],
        },
        User {
            id: "u_gabriel".to_string(),
            name: "Gabriel Martinez".to_string(),
            role: UserRole::Analyst,
            email: "gabriel.martinez@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Gabriel Martinez"),
            skills: vec![skill("Análisis de Datos", 90), skill("Gestión Documental", 85)],
            projects: vec!["PROYECTO_001".to_string()],
        },
        User {
            id: "u_fernando".to_string(),
            name: "Fernando Cid".to_string(),
            role: UserRole::Developer,
            email: "fernando.cid@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Fernando Cid"),
            skills: vec![skill("Desarrollo Frontend", 85), skill("UX/UI", 80)],
            projects: vec!["PROYECTO_002".to_string()],
        },
        User {
            id: "u_francisco".to_string(),
            name: "Francisco Valenzuela".to_string(),
            role: UserRole::Analyst,
            email: "francisco.valenzuela@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Francisco Valenzuela"),
            skills: vec![skill("QA Testing", 90), skill("Documentación", 95)],
            projects: vec!["PROYECTO_001".to_string(), "PROYECTO_003".to_string()],
        },
        User {
            id: "u_anibal".to_string(),
            name: "Anibal Alcazar".to_string(),
            role: UserRole::Developer,
            email: "anibal.alcazar@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Anibal Alcazar"),
            skills: vec![skill("Backend Java", 88), skill("SQL", 85)],
            projects: vec!["PROYECTO_003".to_string()],
        },
        User {
            id: "u_alejandro".to_string(),
            name: "Alejandro Venegas".to_string(),
            role: UserRole::Developer,
            email: "alejandro.venegas@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Alejandro Venegas"),
            skills: vec![skill("Full Stack", 90), skill("Python", 85)],
            projects: vec!["PROYECTO_004".to_string()],
        },
        User {
            id: "u_juan".to_string(),
            name: "Juan Escalona".to_string(),
            role: UserRole::ProjectManager,
            email: "juan.escalona@simpledata.cl".to_string(),
            password: Some("1234".to_string()),
            avatar: avatar("Juan Escalona"),
            skills: vec![skill("Gestión de Equipos", 92), skill("Scrum", 90)],
            projects: vec!["PROYECTO_001".to_string(), "PROYECTO_002".to_string()],
        },
    ]
}

pub fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: "PROYECTO_001".to_string(),
            name: "Sistema de Facturación Interna".to_string(),
            client: "Interno SIMPLEDATA".to_string(),
            encargado_cliente: Some("Gerencia Admin".to_string()),
            lead_id: "u_juan".to_string(),
            team_ids: vec![
                "u_gabriel".to_string(),
                "u_francisco".to_string(),
                "u_soporte".to_string(),
                "u_gonzalo".to_string(),
            ],
            status: ProjectStatus::EnCurso,
            is_ongoing: true,
            report: true,
            start_date: Some("2025-01-15".to_string()),
            deadline: "2025-06-30".to_string(),
            progress: 45,
            year: 2025,
            description: "Desarrollar un sistema interno para la facturación y cobranza de \
                          servicios. Debe integrarse con el sistema de contabilidad."
                .to_string(),
            technologies: vec![
                "AWS".to_string(),
                "Python".to_string(),
                "Spark".to_string(),
                "Terraform".to_string(),
            ],
            logs: vec![
                ProjectLog {
                    id: "l1".to_string(),
                    date: "2025-02-10T10:00:00".to_string(),
                    text: "Inicio de la fase de diseño de arquitectura.".to_string(),
                    author: "Soporte AIWIS".to_string(),
                    link: None,
                },
                ProjectLog {
                    id: "l2".to_string(),
                    date: "2025-02-12T14:30:00".to_string(),
                    text: "Reunión con contabilidad para definir esquema de base de datos."
                        .to_string(),
                    author: "Gabriel Martinez".to_string(),
                    link: None,
                },
            ],
            repositories: vec![
                Repository {
                    id: "r1".to_string(),
                    kind: RepoKind::Github,
                    alias: "Repositorio Oficial".to_string(),
                    url: "https://github.com/soporteaiwis-lab/SIMPLEDATA-APP-CORPORATE-PROYECTOS-OFICIAL-".to_string(),
                },
                Repository {
                    id: "r2".to_string(),
                    kind: RepoKind::Drive,
                    alias: "Documentación Oficial".to_string(),
                    url: "https://drive.google.com/drive/folders/1S3Zavf6xdp9WaM8-gowBJImdkmSD_Niw"
                        .to_string(),
                },
            ],
        },
        Project {
            id: "PROYECTO_002".to_string(),
            name: "Desarrollo de App Móvil Clientes".to_string(),
            client: "Cliente Retail XYZ".to_string(),
            encargado_cliente: Some("Gerente de Innovación".to_string()),
            lead_id: "u_juan".to_string(),
            team_ids: vec!["u_fernando".to_string(), "u_gonzalo".to_string()],
            status: ProjectStatus::EnCurso,
            is_ongoing: true,
            report: true,
            start_date: Some("2025-03-01".to_string()),
            deadline: "2025-09-01".to_string(),
            progress: 10,
            year: 2025,
            description: "App móvil para iOS y Android que permita a los clientes finales \
                          visualizar su estado de cuenta, revisar catálogos y realizar compras."
                .to_string(),
            technologies: vec![
                "React Native".to_string(),
                "Node.js".to_string(),
                "Firebase".to_string(),
            ],
            logs: vec![],
            repositories: vec![Repository {
                id: "r1".to_string(),
                kind: RepoKind::Github,
                alias: "Repositorio Oficial".to_string(),
                url: "https://github.com/soporteaiwis-lab/SIMPLEDATA-APP-CORPORATE-PROYECTOS-OFICIAL-".to_string(),
            }],
        },
        Project {
            id: "PROYECTO_003".to_string(),
            name: "Migración de Servidores Cloud".to_string(),
            client: "Empresa Logística ABC".to_string(),
            encargado_cliente: Some("Jefe de IT".to_string()),
            lead_id: "u_anibal".to_string(),
            team_ids: vec!["u_francisco".to_string(), "u_gonzalo".to_string()],
            status: ProjectStatus::EnCurso,
            is_ongoing: true,
            report: true,
            start_date: Some("2024-10-01".to_string()),
            deadline: "2024-12-20".to_string(),
            progress: 80,
            year: 2024,
            description: "Migrar la infraestructura on-premise del cliente a un entorno cloud \
                          en AWS, optimizando costos y mejorando la escalabilidad."
                .to_string(),
            technologies: vec!["AWS".to_string(), "Docker".to_string(), "Linux".to_string()],
            logs: vec![ProjectLog {
                id: "l1".to_string(),
                date: "2024-12-01T18:00:00".to_string(),
                text: "Instancias EC2 configuradas.".to_string(),
                author: "Anibal Alcazar".to_string(),
                link: None,
            }],
            repositories: vec![],
        },
        Project {
            id: "PROYECTO_004".to_string(),
            name: "Infraestructura DevSecOps".to_string(),
            client: "Banco Financiero".to_string(),
            encargado_cliente: Some("CISO".to_string()),
            lead_id: "u_alejandro".to_string(),
            team_ids: vec!["u_soporte".to_string(), "u_gonzalo".to_string()],
            status: ProjectStatus::EnCurso,
            is_ongoing: true,
            report: true,
            start_date: Some("2025-01-05".to_string()),
            deadline: "2025-08-20".to_string(),
            progress: 25,
            year: 2025,
            description: "Implementación de pipelines de seguridad y auditoría automatizada."
                .to_string(),
            technologies: vec![
                "Jenkins".to_string(),
                "SonarQube".to_string(),
                "Kubernetes".to_string(),
            ],
            logs: vec![ProjectLog {
                id: "l1".to_string(),
                date: "2025-01-20T10:00:00".to_string(),
                text: "Pipelines base creados.".to_string(),
                author: "Alejandro Venegas".to_string(),
                link: None,
            }],
            repositories: vec![],
        },
    ]
}

pub fn seed_gems() -> Vec<Gem> {
    let gem = |id: &str, url: &str, name: &str, description: &str, icon: &str| Gem {
        id: id.to_string(),
        url: url.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    };
    vec![
        gem(
            "g1",
            "https://gemini.google.com/gem/6257c452aac9",
            "COTIZACIONES",
            "Asistente experto en la generación y análisis de cotizaciones.",
            "fa-calculator",
        ),
        gem(
            "g2",
            "https://gemini.google.com/gem/fa10051c004b",
            "PIPELINES AZURE",
            "Especialista en crear pipelines de Azure y archivos JSON.",
            "fa-cloud",
        ),
        gem(
            "g3",
            "https://gemini.google.com/gem/4ca9a51fdffc",
            "MAPEO DATA BRICKS",
            "Analista de código para mapear y entender notebooks de Data Bricks.",
            "fa-project-diagram",
        ),
        gem(
            "g4",
            "https://gemini.google.com/gem/1dbe6e06847f",
            "FACTORIA COBOL",
            "Herramienta para la modernización y análisis de código COBOL.",
            "fa-code",
        ),
        gem(
            "g5",
            "https://gemini.google.com/gem/910761c1caf2",
            "ANALIZADOR REQUERMIENTOS",
            "IA para analizar y desglosar requerimientos de software complejos.",
            "fa-brain",
        ),
        gem(
            "g6",
            "https://gemini.google.com/gem/5745999ccff7",
            "QUIZ CAPACITACIONES",
            "Generador de cuestionarios y quizzes para material de capacitación.",
            "fa-graduation-cap",
        ),
    ]
}

pub fn seed_tools() -> Vec<Tool> {
    let tool = |id: &str, name: &str, url: &str, icon: &str, color: &str| Tool {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        is_local: None,
    };
    vec![
        tool("t1", "VS Code Web", "https://vscode.dev", "fa-code", "text-blue-500"),
        tool("t2", "Azure Portal", "https://portal.azure.com", "fa-cloud", "text-blue-400"),
        tool(
            "t3",
            "AWS Console",
            "https://aws.amazon.com/console/",
            "fa-server",
            "text-orange-500",
        ),
        tool("t4", "ChatGPT", "https://chat.openai.com", "fa-bolt", "text-emerald-500"),
        tool("t5", "Gemini", "https://gemini.google.com", "fa-gem", "text-purple-500"),
        tool(
            "t6",
            "Firebase Console",
            "https://console.firebase.google.com",
            "fa-fire",
            "text-yellow-500",
        ),
        tool("t7", "MongoDB Atlas", "https://cloud.mongodb.com", "fa-leaf", "text-green-500"),
        tool("t8", "GitHub", "https://github.com", "fa-github", "text-slate-800"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_unique() {
        let users = seed_users();
        let mut ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), users.len());
    }

    #[test]
    fn test_seed_projects_reference_seed_users() {
        let users = seed_users();
        for project in seed_projects() {
            assert!(users.iter().any(|u| u.id == project.lead_id));
            for member in &project.team_ids {
                assert!(users.iter().any(|u| &u.id == member), "unknown member {}", member);
            }
        }
    }

    #[test]
    fn test_seed_counts() {
        assert_eq!(seed_users().len(), 8);
        assert_eq!(seed_projects().len(), 4);
        assert_eq!(seed_gems().len(), 6);
        assert_eq!(seed_tools().len(), 8);
    }
}
