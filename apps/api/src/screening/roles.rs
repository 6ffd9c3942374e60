//! Fixed role catalog: the ordered skill list each predefined role is screened against.

use serde::Serialize;

pub const ROLE_CATALOG: &[(&str, &[&str])] = &[
    (
        "AI/ML Engineer",
        &[
            "Python", "PyTorch", "TensorFlow", "Machine Learning", "Deep Learning", "MLOps",
            "Scikit-Learn", "NLP", "Computer Vision", "Reinforcement Learning", "Hugging Face",
            "Data Engineering", "Feature Engineering", "AutoML",
        ],
    ),
    (
        "Frontend Engineer",
        &[
            "React", "Vue", "Angular", "HTML5", "CSS3", "JavaScript", "TypeScript", "Next.js",
            "Svelte", "Bootstrap", "Tailwind CSS", "GraphQL", "Redux", "WebAssembly", "Three.js",
            "Performance Optimization",
        ],
    ),
    (
        "Backend Engineer",
        &[
            "Python", "Java", "Node.js", "REST APIs", "Cloud services", "Kubernetes", "Docker",
            "GraphQL", "Microservices", "gRPC", "Spring Boot", "Flask", "FastAPI",
            "SQL & NoSQL Databases", "Redis", "RabbitMQ", "CI/CD",
        ],
    ),
    (
        "Data Engineer",
        &[
            "Python", "SQL", "Apache Spark", "Hadoop", "Kafka", "ETL Pipelines", "Airflow",
            "BigQuery", "Redshift", "Data Warehousing", "Snowflake", "Azure Data Factory", "GCP",
            "AWS Glue", "DBT",
        ],
    ),
    (
        "DevOps Engineer",
        &[
            "Kubernetes", "Docker", "Terraform", "CI/CD", "AWS", "Azure", "GCP", "Jenkins",
            "Ansible", "Prometheus", "Grafana", "Helm", "Linux Administration", "Networking",
            "Site Reliability Engineering (SRE)",
        ],
    ),
    (
        "Full Stack Developer",
        &[
            "JavaScript", "TypeScript", "React", "Node.js", "Express", "MongoDB", "SQL", "HTML5",
            "CSS3", "RESTful APIs", "Git", "CI/CD", "Cloud Services", "Responsive Design",
            "Authentication & Authorization",
        ],
    ),
    (
        "Product Manager",
        &[
            "Product Strategy", "User Research", "Agile Methodologies", "Roadmapping",
            "Market Analysis", "Stakeholder Management", "Data Analysis", "User Stories",
            "Product Lifecycle", "A/B Testing", "KPI Definition", "Prioritization",
            "Competitive Analysis", "Customer Journey Mapping",
        ],
    ),
    (
        "Data Scientist",
        &[
            "Python", "R", "SQL", "Machine Learning", "Statistics", "Data Visualization", "Pandas",
            "NumPy", "Scikit-learn", "Jupyter", "Hypothesis Testing", "Experimental Design",
            "Feature Engineering", "Model Evaluation",
        ],
    ),
];

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub name: &'static str,
    pub skills: &'static [&'static str],
}

pub fn list_roles() -> Vec<RoleSummary> {
    ROLE_CATALOG
        .iter()
        .map(|&(name, skills)| RoleSummary { name, skills })
        .collect()
}

/// Skill list for a catalog role. Role names match case-insensitively.
pub fn role_skills(role: &str) -> Option<Vec<String>> {
    let role = role.trim();
    ROLE_CATALOG
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(role))
        .map(|(_, skills)| skills.iter().map(|s| s.to_string()).collect())
}
