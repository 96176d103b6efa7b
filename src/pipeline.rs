use itertools::Itertools;
use log::info;

use crate::{
    db::fingrid::{
        datasets::{Dataset, Series},
        lib_fingrid::{FingridClient, FingridError},
    },
    pacing::Pacer,
};

/// The five series of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedSeries {
    pub consumption: Series,
    pub production: Series,
    pub wind: Series,
    pub nuclear: Series,
    pub water: Series,
}

impl FetchedSeries {
    pub fn get(&self, dataset: Dataset) -> &Series {
        use Dataset::*;
        match dataset {
            Consumption => &self.consumption,
            Production => &self.production,
            Wind => &self.wind,
            Nuclear => &self.nuclear,
            Water => &self.water,
        }
    }

    fn get_mut(&mut self, dataset: Dataset) -> &mut Series {
        use Dataset::*;
        match dataset {
            Consumption => &mut self.consumption,
            Production => &mut self.production,
            Wind => &mut self.wind,
            Nuclear => &mut self.nuclear,
            Water => &mut self.water,
        }
    }
}

/// Fetch all datasets one after the other, pausing between requests.
/// The first transport or payload error aborts the run.
pub async fn fetch_all<P: Pacer + ?Sized>(
    client: &FingridClient,
    pacer: &P,
) -> Result<FetchedSeries, FingridError> {
    info!(
        "fetching datasets {} from {} to {}",
        Dataset::ALL.iter().map(|d| d.id()).join(", "),
        client.window.start,
        client.window.end
    );
    let mut fetched = FetchedSeries::default();
    for (i, dataset) in Dataset::ALL.iter().enumerate() {
        *fetched.get_mut(*dataset) = client.fetch(*dataset).await?;
        if i + 1 < Dataset::ALL.len() {
            pacer.pause().await;
        }
    }
    Ok(fetched)
}
