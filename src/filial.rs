use std::{fmt, str::FromStr};

use crate::RemessaError;

/// Razão social usada como emitente em todos os documentos.
pub const NOME_EMITENTE: &str = "DHL EXPRESS (BRAZIL) LTDA";

/// Identidade fiscal fixa de uma filial de origem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentidadeFilial {
    pub cnpj: &'static str,
    pub inscricao_estadual: &'static str,
    pub cep: &'static str,
    pub rua: &'static str,
    pub complemento: &'static str,
    pub numero: &'static str,
    pub bairro: &'static str,
    pub ibge: &'static str,
}

/// Filiais DHL conhecidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filial {
    /// Porto Alegre
    Poa,
    /// Blumenau
    Bnu,
    /// Curitiba
    Cwb,
}

impl Filial {
    pub const TODAS: [Filial; 3] = [Filial::Poa, Filial::Bnu, Filial::Cwb];

    pub fn codigo(self) -> &'static str {
        match self {
            Filial::Poa => "POA",
            Filial::Bnu => "BNU",
            Filial::Cwb => "CWB",
        }
    }

    /// Armazenado no binário: nenhuma tabela é carregada em tempo de execução.
    pub fn identidade(self) -> &'static IdentidadeFilial {
        match self {
            Filial::Poa => &IdentidadeFilial {
                cnpj: "58.890.252/0005-47",
                inscricao_estadual: "0962474932",
                cep: "90200290",
                rua: "AV DAS INDUSTRIAS",
                complemento: "",
                numero: "1270",
                bairro: "ANCHIETA",
                ibge: "4314902",
            },
            Filial::Bnu => &IdentidadeFilial {
                cnpj: "58.890.252/0001-13",
                inscricao_estadual: "109746831115",
                cep: "05317020",
                rua: "AVENIDA MANUEL BANDEIRA",
                complemento: "",
                numero: "291",
                bairro: "VILA LEOPOLDINA",
                ibge: "3550308",
            },
            Filial::Cwb => &IdentidadeFilial {
                cnpj: "58.890.252/0014-38",
                inscricao_estadual: "9016480778",
                cep: "80000001",
                rua: "RUA DOUTOR REYNALDO MACHADO",
                complemento: "",
                numero: "1469",
                bairro: "REBOUCAS",
                ibge: "4106902",
            },
        }
    }
}

impl FromStr for Filial {
    type Err = RemessaError;

    /// ```
    /// use converter_remessas_dhl::Filial;
    ///
    /// let filial: Filial = "poa".parse().unwrap();
    /// assert_eq!(filial.identidade().cnpj, "58.890.252/0005-47");
    /// assert!("XYZ".parse::<Filial>().is_err());
    /// ```
    fn from_str(codigo: &str) -> Result<Self, Self::Err> {
        Filial::TODAS
            .into_iter()
            .find(|filial| filial.codigo().eq_ignore_ascii_case(codigo.trim()))
            .ok_or_else(|| RemessaError::FilialDesconhecida(codigo.to_string()))
    }
}

impl fmt::Display for Filial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codigo())
    }
}
