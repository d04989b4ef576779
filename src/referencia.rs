use std::{collections::HashMap, path::Path};
use tracing::{debug, warn};

use crate::{
    COLUNA_IBGE, COLUNA_IE_CNPJ, COLUNA_IE_INSCRICAO, COLUNA_MUNICIPIO, Filial, RE_NON_DIGITS,
    RemessaResult, Tabela, ler_csv, verificar_colunas_essenciais,
};

/// Chave composta `UF_CIDADE`, com os espaços da cidade trocados por '_'.
///
/// Sem UF ou sem cidade não há chave (a remessa irá para o arquivo de erro).
///
/// ```
/// use converter_remessas_dhl::chave_municipio;
///
/// assert_eq!(chave_municipio(Some("RS"), Some("PORTO ALEGRE")).as_deref(), Some("RS_PORTO_ALEGRE"));
/// assert_eq!(chave_municipio(None, Some("PORTO ALEGRE")), None);
/// ```
pub fn chave_municipio(estado: Option<&str>, cidade: Option<&str>) -> Option<String> {
    let (estado, cidade) = (estado?, cidade?);
    Some(format!("{}_{}", estado, cidade.replace(' ', "_")))
}

/// Tabela `UF_CIDADE` -> código IBGE do município.
///
/// Carregada uma vez por execução e somente lida depois disso.
#[derive(Debug, Clone, Default)]
pub struct TabelaMunicipios {
    codigos: HashMap<String, String>,
}

impl TabelaMunicipios {
    pub fn carregar(caminho: &Path) -> RemessaResult<Self> {
        let tabela = ler_csv(caminho)?;
        let municipios = Self::from_tabela(&tabela, caminho)?;

        debug!("{} municípios carregados de {:?}", municipios.len(), caminho);
        Ok(municipios)
    }

    /// Em chaves repetidas prevalece a primeira ocorrência.
    pub fn from_tabela(tabela: &Tabela, arquivo: &Path) -> RemessaResult<Self> {
        verificar_colunas_essenciais(tabela, &[COLUNA_MUNICIPIO, COLUNA_IBGE], arquivo)?;

        let idx_chave = tabela.indice(COLUNA_MUNICIPIO).unwrap_or_default();
        let idx_ibge = tabela.indice(COLUNA_IBGE).unwrap_or_default();

        let mut codigos = HashMap::with_capacity(tabela.len());

        for linha in &tabela.linhas {
            if let (Some(chave), Some(ibge)) =
                (Tabela::valor(linha, idx_chave), Tabela::valor(linha, idx_ibge))
            {
                codigos
                    .entry(chave.to_string())
                    .or_insert_with(|| ibge.to_string());
            }
        }

        Ok(TabelaMunicipios { codigos })
    }

    pub fn codigo_ibge(&self, chave: &str) -> Option<&str> {
        self.codigos.get(chave).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codigos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codigos.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TabelaMunicipios
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut codigos = HashMap::new();
        for (chave, ibge) in iter {
            codigos.entry(chave.into()).or_insert_with(|| ibge.into());
        }
        TabelaMunicipios { codigos }
    }
}

/// Tabela CNPJ -> inscrição estadual.
///
/// Usada apenas para conferir a inscrição fixa da filial emitente.
#[derive(Debug, Clone, Default)]
pub struct TabelaInscricoes {
    inscricoes: HashMap<String, String>,
}

impl TabelaInscricoes {
    pub fn carregar(caminho: &Path) -> RemessaResult<Self> {
        let tabela = ler_csv(caminho)?;
        Self::from_tabela(&tabela, caminho)
    }

    pub fn from_tabela(tabela: &Tabela, arquivo: &Path) -> RemessaResult<Self> {
        verificar_colunas_essenciais(tabela, &[COLUNA_IE_CNPJ, COLUNA_IE_INSCRICAO], arquivo)?;

        let idx_cnpj = tabela.indice(COLUNA_IE_CNPJ).unwrap_or_default();
        let idx_ie = tabela.indice(COLUNA_IE_INSCRICAO).unwrap_or_default();

        let inscricoes = tabela
            .linhas
            .iter()
            .filter_map(|linha| {
                let cnpj = Tabela::valor(linha, idx_cnpj)?;
                let ie = Tabela::valor(linha, idx_ie)?;
                Some((somente_digitos(cnpj), somente_digitos(ie)))
            })
            .collect();

        Ok(TabelaInscricoes { inscricoes })
    }

    pub fn inscricao(&self, cnpj: &str) -> Option<&str> {
        self.inscricoes
            .get(&somente_digitos(cnpj))
            .map(String::as_str)
    }

    /// Retorna a inscrição da tabela quando ela diverge da inscrição fixa da filial.
    pub fn conferir_filial(&self, filial: Filial) -> Option<&str> {
        let identidade = filial.identidade();

        let divergente = self
            .inscricao(identidade.cnpj)
            .filter(|&ie| ie != somente_digitos(identidade.inscricao_estadual));

        if let Some(ie) = divergente {
            warn!(
                "Inscrição estadual da filial {filial} ({}) diverge da tabela de referência: {ie}",
                identidade.inscricao_estadual
            );
        }

        divergente
    }
}

fn somente_digitos(texto: &str) -> String {
    RE_NON_DIGITS.replace_all(texto, "").into_owned()
}
