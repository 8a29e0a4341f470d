// Copyright (c) 2025 Assocompta contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, EntryKind, Subcategory};

fn cat(code: &str, name: &str, kind: EntryKind, subs: &[(&str, &str)]) -> Category {
    Category {
        id: format!("cat-{}", code),
        code: code.to_string(),
        name: name.to_string(),
        kind,
        subcategories: subs
            .iter()
            .map(|(sub_code, sub_name)| Subcategory {
                code: sub_code.to_string(),
                name: sub_name.to_string(),
                parent_code: code.to_string(),
            })
            .collect(),
    }
}

/// The association's chart of accounts, seeded into an empty store on
/// first init.
pub fn default_plan() -> Vec<Category> {
    use EntryKind::{Depense, Recette};
    vec![
        cat(
            "70",
            "Ventes de prestations de services",
            Recette,
            &[
                ("701", "Billetterie événements"),
                ("702", "Recettes bar"),
                ("703", "Merchandising"),
                ("704", "Ateliers et formations"),
            ],
        ),
        cat(
            "74",
            "Subventions d'exploitation",
            Recette,
            &[
                ("741", "Subventions publiques"),
                ("742", "Subventions privées"),
                ("743", "Subventions européennes"),
            ],
        ),
        cat(
            "75",
            "Autres produits de gestion courante",
            Recette,
            &[
                ("751", "Cotisations adhérents"),
                ("752", "Dons et mécénat"),
                ("753", "Partenariats"),
            ],
        ),
        cat(
            "76",
            "Produits financiers",
            Recette,
            &[
                ("761", "Intérêts bancaires"),
                ("762", "Autres produits financiers"),
            ],
        ),
        cat(
            "60",
            "Achats",
            Depense,
            &[
                ("601", "Matières premières"),
                ("602", "Fournitures consommables"),
                ("603", "Boissons et nourriture"),
                ("604", "Matériel technique"),
            ],
        ),
        cat(
            "61",
            "Services extérieurs",
            Depense,
            &[
                ("611", "Locations immobilières"),
                ("612", "Locations mobilières"),
                ("613", "Locations matériel"),
                ("614", "Entretien et réparations"),
            ],
        ),
        cat(
            "62",
            "Autres services extérieurs",
            Depense,
            &[
                ("621", "Personnel extérieur"),
                ("622", "Rémunérations artistes"),
                ("623", "Publicité et communication"),
                ("624", "Transports et déplacements"),
                ("625", "Frais postaux"),
                ("626", "Frais bancaires"),
            ],
        ),
        cat(
            "63",
            "Impôts et taxes",
            Depense,
            &[("631", "SACEM/SPEDIDAM"), ("632", "Taxes diverses")],
        ),
        cat(
            "64",
            "Charges de personnel",
            Depense,
            &[("641", "Salaires bruts"), ("642", "Charges sociales")],
        ),
        cat(
            "65",
            "Autres charges de gestion courante",
            Depense,
            &[("651", "Redevances"), ("652", "Pertes sur créances")],
        ),
        cat(
            "66",
            "Charges financières",
            Depense,
            &[
                ("661", "Intérêts d'emprunts"),
                ("662", "Charges sur cessions"),
            ],
        ),
        cat(
            "68",
            "Dotations aux amortissements",
            Depense,
            &[
                ("681", "Amortissement matériel"),
                ("682", "Amortissement mobilier"),
            ],
        ),
    ]
}
