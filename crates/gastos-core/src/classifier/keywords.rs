//! Built-in keyword table
//!
//! A denser, read-only vocabulary per category name, used after the learned
//! per-category keywords have failed and as a weighted signal when ranking
//! suggestions. Categories are matched to stored ones by exact name.

/// (category name, keywords) in priority order
pub const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    (
        "Alimentação",
        &[
            "supermercado", "mercado", "hipermercado", "extra", "carrefour", "pão de açúcar",
            "restaurante", "lanchonete", "pizzaria", "hamburgueria", "comida", "lanche",
            "padaria", "açougue", "hortifruti", "verdura", "fruta", "carne", "peixe",
            "ifood", "uber eats", "delivery", "entrega", "marmita", "buffet",
            "café", "cafeteria", "bar", "pub", "cerveja", "bebida", "refrigerante",
        ],
    ),
    (
        "Transporte",
        &[
            "uber", "taxi", "cabify", "99", "combustível", "gasolina", "etanol", "diesel",
            "ônibus", "metro", "metrô", "trem", "cptm", "bilhete único", "vale transporte",
            "estacionamento", "zona azul", "pedágio", "multa", "ipva", "licenciamento",
            "mecânico", "oficina", "pneu", "óleo", "revisão", "lavagem", "carro",
            "moto", "bicicleta", "patinete", "viagem", "passagem", "avião", "rodoviária",
        ],
    ),
    (
        "Moradia",
        &[
            "aluguel", "condomínio", "água", "luz", "energia elétrica", "gás", "internet",
            "telefone", "celular", "tv", "streaming", "netflix", "amazon prime",
            "seguro residencial", "iptu", "reforma", "pintura", "eletricista", "encanador",
            "móveis", "decoração", "limpeza", "faxina", "produto de limpeza",
            "manutenção", "portaria", "zelador", "administradora",
        ],
    ),
    (
        "Saúde",
        &[
            "farmácia", "drogaria", "remédio", "medicamento", "genérico",
            "médico", "consulta", "particular", "convênio", "plano de saúde",
            "dentista", "ortodontia", "aparelho", "limpeza dental",
            "exame", "laboratorio", "raio x", "ultrassom", "ressonância",
            "hospital", "pronto socorro", "emergência", "cirurgia",
            "fisioterapia", "psicólogo", "terapia", "academia", "exercício",
        ],
    ),
    (
        "Lazer",
        &[
            "cinema", "filme", "teatro", "show", "concerto", "festival",
            "viagem", "hotel", "pousada", "hospedagem", "turismo",
            "festa", "balada", "clube", "diversão", "entretenimento",
            "parque", "zoológico", "museu", "exposição", "evento",
            "jogo", "videogame", "steam", "playstation", "xbox",
            "livro", "revista", "jornal", "spotify", "youtube premium",
        ],
    ),
    (
        "Educação",
        &[
            "curso", "faculdade", "universidade", "escola", "colégio",
            "mensalidade", "matrícula", "material escolar", "livro didático",
            "curso online", "udemy", "coursera", "alura", "treinamento",
            "certificação", "prova", "vestibular", "enem", "concurso",
            "idioma", "inglês", "espanhol", "francês", "alemão",
            "papelaria", "caneta", "caderno", "mochila",
        ],
    ),
    (
        "Vestuário",
        &[
            "roupa", "calça", "camisa", "camiseta", "blusa", "vestido",
            "sapato", "tênis", "sandália", "bota", "chinelo",
            "underwear", "calcinha", "sutiã", "cueca", "meia",
            "casaco", "jaqueta", "agasalho", "short", "bermuda",
            "acessório", "bolsa", "carteira", "relógio", "óculos",
            "loja", "shopping", "outlet", "promoção", "desconto",
            "lavanderia", "lavagem a seco", "costureira", "ajuste",
        ],
    ),
    (
        "Trabalho",
        &[
            "material de escritório", "notebook", "computador", "mouse", "teclado",
            "impressora", "papel", "tinta", "caneta", "lápis",
            "software", "licença", "microsoft office", "adobe",
            "coworking", "escritório", "aluguel comercial",
            "contador", "contabilidade", "imposto", "darf",
            "viagem de trabalho", "reembolso", "combustível trabalho",
        ],
    ),
    (
        "Investimento",
        &[
            "aplicação", "investimento", "poupança", "cdb", "lci", "lca",
            "tesouro direto", "ação", "fundo", "previdência",
            "corretora", "taxa de corretagem", "custódia",
            "bitcoin", "criptomoeda", "ethereum", "exchange",
        ],
    ),
];

/// Built-in keywords for a category name, if the table knows it
pub fn table_keywords(category_name: &str) -> Option<&'static [&'static str]> {
    KEYWORD_TABLE
        .iter()
        .find(|(name, _)| *name == category_name)
        .map(|(_, keywords)| *keywords)
}

/// Built-in keywords found verbatim in an already-normalized description
pub fn matches_in<'k>(normalized: &str, keywords: &'k [&'k str]) -> Vec<&'k str> {
    keywords
        .iter()
        .copied()
        .filter(|kw| normalized.contains(kw))
        .collect()
}
