use std::path::Path;

use ixa_vaccination::log::{debug, info, trace};
use ixa_vaccination::random::RandomSource;
use ixa_vaccination::{
    define_rng, CatalogDelaySampler, ManagerId, PersonId, VaccinationError, VaccinationEvent,
    VaccinationEventRow, VaccinationHistory, VaccinationParameters, VaccinationRecord,
    VaccinationReport, VaccineId,
};

define_rng!(PopulationRng);
define_rng!(VaccineRng);

// A single manager issues every vaccination in this campaign.
const CAMPAIGN_MANAGER: ManagerId = ManagerId::new(0);

struct Person {
    id: PersonId,
    age: f64,
    vaccinations: VaccinationHistory,
}

#[derive(Debug, Default, PartialEq)]
pub struct CampaignSummary {
    pub vaccinated: usize,
    pub protected_at_end: usize,
    pub report_rows: usize,
}

fn load_population(parameters: &VaccinationParameters, random: &mut RandomSource) -> Vec<Person> {
    trace!("Creating {} people", parameters.population);
    let (min_age, max_age) = parameters.age_range;
    (0..parameters.population)
        .map(|index| Person {
            id: PersonId::new(index),
            age: random.sample_range(PopulationRng, min_age..max_age),
            vaccinations: VaccinationHistory::new(),
        })
        .collect()
}

/// Gives the first vaccine in the catalog to everyone old enough on the vaccination day, then
/// advances everyone through the last day, writing each dose and change in protection to the
/// report.
pub fn run(
    parameters: &VaccinationParameters,
    output_dir: &Path,
) -> Result<CampaignSummary, VaccinationError> {
    let mut random = RandomSource::new(parameters.seed);
    let mut population = load_population(parameters, &mut random);
    let mut report = VaccinationReport::create(&output_dir.join(&parameters.output_file))?;

    let catalog = &parameters.vaccines;
    let vaccine_id = VaccineId::new(0);
    let vaccine = catalog
        .get(vaccine_id)
        .ok_or_else(|| VaccinationError::from("no vaccines defined"))?;
    let mut sampler = CatalogDelaySampler::new(catalog, random.get_rng(VaccineRng));

    let mut summary = CampaignSummary::default();
    for day in 0..=parameters.max_day {
        for person in &mut population {
            if day == parameters.vaccination_day && vaccine.is_within_age(person.age) {
                let dose = person.vaccinations.take_vaccine(
                    day,
                    vaccine_id,
                    person.age,
                    person.id,
                    CAMPAIGN_MANAGER,
                    &mut sampler,
                    catalog,
                )?;
                report.send(&VaccinationEventRow {
                    day,
                    person_id: person.id.id(),
                    vaccine_id: vaccine_id.id(),
                    dose,
                    event: VaccinationEvent::DoseAdministered,
                })?;
                summary.vaccinated += 1;
            }

            let changes = person
                .vaccinations
                .update(day, person.age, &mut sampler, catalog)?;
            for (vaccine, outcome) in changes {
                let dose = person
                    .vaccinations
                    .record_for(vaccine)
                    .map_or(0, VaccinationRecord::current_dose);
                report.send_outcome(day, person.id, vaccine, dose, &outcome)?;
            }
        }

        if day % 30 == 0 {
            let protected = population
                .iter()
                .filter(|person| person.vaccinations.is_protected())
                .count();
            debug!("Day {day}: {protected} people protected");
        }
    }

    summary.protected_at_end = population
        .iter()
        .filter(|person| person.vaccinations.is_protected())
        .count();
    report.flush()?;
    summary.report_rows = report.rows_written();
    info!("Campaign finished after {} days", parameters.max_day);
    Ok(summary)
}
