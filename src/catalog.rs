//! Static storefront catalog: category tree and featured products
//!
//! Products are tagged on the platform with the category or subcategory
//! slug, so a slug here doubles as the `tag:` search used to list them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Subcategory {
    pub name: &'static str,
    pub slug: &'static str,
    /// Highlighted product line inside the category
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub slug: &'static str,
    pub subcategories: &'static [Subcategory],
}

impl Category {
    pub fn featured(&self) -> Option<&'static Subcategory> {
        self.subcategories.iter().find(|s| s.featured)
    }

    pub fn subcategory(&self, slug: &str) -> Option<&'static Subcategory> {
        self.subcategories.iter().find(|s| s.slug == slug)
    }
}

const fn sub(name: &'static str, slug: &'static str) -> Subcategory {
    Subcategory {
        name,
        slug,
        featured: false,
    }
}

const fn featured(name: &'static str, slug: &'static str) -> Subcategory {
    Subcategory {
        name,
        slug,
        featured: true,
    }
}

pub static CATEGORIES: &[Category] = &[
    Category {
        name: "Eixos / Pillow",
        slug: "eixos-pillow",
        subcategories: &[
            sub("Casca de Pillow Block", "casca-pillow-block"),
            sub("Eixo com Suporte de Alumínio", "eixo-suporte-aluminio"),
            sub("Eixo Linear", "eixo-linear"),
            sub("Pillow Aberto – SBR", "pillow-aberto-sbr"),
            sub("Pillow Aberto Longo – SBR..LUU", "pillow-aberto-longo"),
            sub("Pillow Fechado – SCS", "pillow-fechado-scs"),
            sub("Pillow Fechado Longo – SCS..LUU", "pillow-fechado-longo"),
            featured("Pillow Block Fechado 25mm", "pillow-block-25mm"),
        ],
    },
    Category {
        name: "Guia Linear / Patins",
        slug: "guia-linear-patins",
        subcategories: &[
            sub("Patins de Aço", "patins-aco"),
            sub("Patins de Níquel", "patins-niquel"),
            sub("Patins Padrão", "patins-padrao"),
            sub("Patins Padrão – Alongado", "patins-padrao-alongado"),
            sub("Patins Perfil Baixo", "patins-perfil-baixo"),
            sub("Patins Série Mini", "patins-serie-mini"),
            sub("Ponto de Lubrificação", "ponto-lubrificacao"),
            sub("Raspador", "raspador"),
            sub("Tanque de Óleo para Bloco Linear", "tanque-oleo"),
            sub("Guia Linear Padrão", "guia-linear-padrao"),
            sub("Guia Linear Perfil Baixo", "guia-linear-perfil-baixo"),
            sub("Guia Linear de Cromo", "guia-linear-cromo"),
            sub("Guia Linear Série Mini", "guia-linear-serie-mini"),
            featured("GLP – Guia Linear de 15mm", "glp-15mm"),
        ],
    },
    Category {
        name: "Fuso de Esferas",
        slug: "fuso-esferas",
        subcategories: &[
            sub("Fuso de Esferas Laminado C7", "fuso-laminado-c7"),
            sub("Castanha Passo Padrão", "castanha-passo-padrao"),
            sub("Suporte Para Castanha", "suporte-castanha"),
            sub("Castanha Dupla", "castanha-dupla"),
            sub("Fuso de Esfera Passo Rápido", "fuso-passo-rapido"),
            sub("Castanha Passo Rápido", "castanha-passo-rapido"),
            sub("Usinagem e Manutenção", "usinagem-manutencao"),
            sub("KITs de Fuso de Esferas", "kits-fuso"),
            featured("Fuso de Esfera Laminado 12mm Passo 04", "fuso-12mm-passo-04"),
        ],
    },
    Category {
        name: "Perfil Estrutural",
        slug: "perfil-estrutural",
        subcategories: &[
            sub("Acabamentos", "acabamentos"),
            sub("Arruelas", "arruelas"),
            sub("Cantoneiras", "cantoneiras"),
            sub("Conectores", "conectores"),
            sub("Dobradiças", "dobradicas"),
            sub("Parafuso Allen Cabeça Abaulada", "parafuso-allen-abaulada"),
            sub("Parafuso Allen Cabeça Cônica", "parafuso-allen-conica"),
            sub("Parafuso e Porca Martelo", "parafuso-porca-martelo"),
            sub("Perfil – Base 20", "perfil-base-20"),
            sub("Perfil – Base 30", "perfil-base-30"),
            sub("Perfil – Base 40", "perfil-base-40"),
            sub("Perfil – Base 45", "perfil-base-45"),
            sub("Pés de Nivelamento / Pés de Borracha", "pes-nivelamento"),
            sub("Porca Quadrada", "porca-quadrada"),
            sub("Porca Sextavada Flangeada", "porca-sextavada"),
            sub("Porca T Deslizante", "porca-t-deslizante"),
            sub("Puxador Manipulo – Tipo Alça", "puxador-manipulo"),
            sub("Rodízio Giratório", "rodizio-giratorio"),
            sub("Perfil – Base 60", "perfil-base-60"),
            featured("Perfil Estrutural 20×40 T-Slot Canal 6mm", "perfil-20x40-t-slot"),
        ],
    },
    Category {
        name: "Rolamento Linear",
        slug: "rolamento-linear",
        subcategories: &[
            sub("KH…PP", "kh-pp"),
            sub("LM…OP", "lm-op"),
            sub("LM…UU | LM…LUU", "lm-uu-luu"),
            sub("LME…AJ – Especial Ajustável", "lme-aj"),
            sub("LME…OP", "lme-op"),
            sub("LME…UU", "lme-uu"),
            sub("LMF…UU | LMF…LUU", "lmf-uu-luu"),
            sub("LMH…UU | LMH…LUU", "lmh-uu-luu"),
            sub("LMK…UU | LMK…LUU", "lmk-uu-luu"),
            featured("Rolamento LM20UU", "rolamento-lm20uu"),
        ],
    },
    Category {
        name: "Rolamento Radial",
        slug: "rolamento-radial",
        subcategories: &[
            sub("Autocompensador", "autocompensador"),
            sub("Contato Angular", "contato-angular"),
            sub("Rígido de Esferas – ZZ", "rigido-esferas-zz"),
            sub("Rolo Cônico", "rolo-conico"),
            featured("Rolamento Rígido de Esferas 6000ZZ Radial", "rolamento-6000zz"),
        ],
    },
    Category {
        name: "Mancal",
        slug: "mancal",
        subcategories: &[
            sub("BKBF – Mancais para Fuso", "bkbf-fuso"),
            sub("EKEF – Mancais para Fuso", "ekef-fuso"),
            sub("FKFF – Mancais para Fuso", "fkff-fuso"),
            sub("KFL – Mancais para Eixo", "kfl-eixo"),
            sub("SHF – Mancais para Eixo", "shf-eixo"),
            sub("SK – Mancais para Eixo", "sk-eixo"),
            sub("UCF – Mancais para Eixo", "ucf-eixo"),
            sub("UCFL – Mancais para Eixo", "ucfl-eixo"),
            sub("UCP – Mancais para Eixo", "ucp-eixo"),
            featured("Mancal Fixo SK para Eixo 25mm", "mancal-sk-25mm"),
        ],
    },
];

/// Product shown on the home page rails
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturedProduct {
    pub name: &'static str,
    pub price: f64,
    pub price_per_meter: bool,
    pub handle: &'static str,
    pub category: &'static str,
}

pub static FEATURED_PRODUCTS: &[FeaturedProduct] = &[FeaturedProduct {
    name: "Perfil Estrutural em Alumínio 20x40 V-Slot Preto - Canal 6",
    price: 99.0,
    price_per_meter: true,
    handle: "perfil-estrutural-em-aluminio-20x40-v-slot-preto-canal-6",
    category: "perfil-estrutural",
}];

pub fn category(slug: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.slug == slug)
}

/// Search query listing the products of a category or one of its subcategories
pub fn tag_query(category_slug: &str, subcategory_slug: Option<&str>) -> String {
    format!("tag:{}", subcategory_slug.unwrap_or(category_slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_one_featured_line() {
        assert_eq!(CATEGORIES.len(), 7);
        for category in CATEGORIES {
            let count = category.subcategories.iter().filter(|s| s.featured).count();
            assert_eq!(count, 1, "category {}", category.slug);
        }
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<&str> = CATEGORIES
            .iter()
            .flat_map(|c| std::iter::once(c.slug).chain(c.subcategories.iter().map(|s| s.slug)))
            .collect();
        let total = slugs.len();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), total);
    }

    #[test]
    fn test_lookup() {
        let perfil = category("perfil-estrutural").unwrap();
        assert_eq!(perfil.featured().unwrap().slug, "perfil-20x40-t-slot");
        assert!(perfil.subcategory("porca-t-deslizante").is_some());
        assert!(category("nao-existe").is_none());
    }

    #[test]
    fn test_tag_query_prefers_subcategory() {
        assert_eq!(tag_query("mancal", None), "tag:mancal");
        assert_eq!(tag_query("mancal", Some("sk-eixo")), "tag:sk-eixo");
    }
}
